use log::{debug, info};

use crate::convert::convert_token;
use crate::cribl_utils::cribl_helper::CriblHelper;
use crate::errors::MigrateError;
use crate::splunk_utils::hec_export::HecExportReader;
use crate::Cli;

/// Runs one migration: read the export, log in, push every token.
///
/// Tokens are pushed in file order and the first failure of any kind
/// aborts the run. Returns the number of tokens migrated.
pub fn run(cli: &Cli) -> Result<usize, MigrateError> {
    // Open the export before touching the network so path problems
    // surface without a login round-trip.
    let reader = HecExportReader::open(&cli.csv_path)?;
    let cribl = CriblHelper::login(&cli.host, &cli.username, &cli.password)?;

    let mut migrated = 0;
    for record in reader {
        let splunk_token = record?;
        info!("Moving {}", splunk_token.title);

        let cribl_token = convert_token(&splunk_token);
        let details = cribl.create_hec_token(&cli.worker_group, &cli.input_id, &cribl_token)?;
        debug!("Cribl response for {}: {}", splunk_token.title, details);
        migrated += 1;
    }

    Ok(migrated)
}
