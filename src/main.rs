use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use env_logger;
use log::{error, info};

mod convert;
mod cribl_utils;
mod errors;
mod migrate;
mod splunk_utils;

use errors::MigrateError;

/// Command line arguments for the splunk2cribl application.
#[derive(Parser, Debug)]
#[command(name = "splunk2cribl", about = "Migrate Splunk HEC tokens to Cribl Stream HEC inputs.")]
struct Cli {
    /// Increase output verbosity (DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'v', long = "verbosity", default_value = "INFO")]
    verbosity: String,

    /// Path to the Splunk HEC token export CSV
    csv_path: PathBuf,

    /// On-prem Cribl leader, e.g. 'https://cribl.myhost:9000'
    host: String,

    /// Cribl local username
    username: String,

    /// Cribl local password
    password: String,

    /// Input ID without the colon prefix, so if your
    /// __inputId=='splunk_hec:in_splunk_hec', you would put 'in_splunk_hec'.
    /// Defaults to 'in_splunk_hec'.
    #[arg(long = "input-id", default_value = "in_splunk_hec")]
    input_id: String,

    /// Worker group whose HEC input receives the tokens. Defaults to 'default'.
    #[arg(long = "worker-group", default_value = "default")]
    worker_group: String,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.verbosity.as_str())
    ).init();

    let start = Instant::now();

    match migrate::run(&cli) {
        Ok(migrated) => info!("Migrated {} token(s) in {:?}", migrated, start.elapsed()),
        Err(err) => {
            // A rejected submission also dumps Cribl's raw response body,
            // highlighted red so it stands out from the log stream.
            if let MigrateError::Submission { body, .. } = &err {
                error!("\x1b[91m{}\x1b[0m", body);
            }
            error!("{}", err);
            std::process::exit(1);
        }
    }
}
