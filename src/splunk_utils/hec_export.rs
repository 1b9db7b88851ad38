use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::errors::MigrateError;

/// One row of a Splunk HEC token export.
///
/// All seven columns must be present in the header row; unknown columns
/// are rejected rather than silently dropped. `source`, `sourcetype` and
/// `indexes` use the empty string as "not set".
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplunkHecToken {
    /// Human label for the token.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// The token secret. Copied to Cribl verbatim.
    pub token: String,
    /// Optional source override.
    pub source: String,
    /// Optional sourcetype override.
    pub sourcetype: String,
    /// Default index. Always the fallback value at evaluation time,
    /// whether or not an allow-list is set.
    pub index: String,
    /// Allowed index names, split from the comma-delimited export field at
    /// parse time. An empty field yields an empty list (no restriction).
    #[serde(deserialize_with = "split_indexes")]
    pub indexes: Vec<String>,
}

/// Splits the raw `indexes` field on commas, keeping entries verbatim (no
/// trimming) and in their original order.
fn split_indexes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    Ok(raw.split(',').map(str::to_string).collect())
}

/// Lazy single-pass reader over a Splunk HEC token export.
///
/// Rows come back one at a time in file order; a malformed row surfaces as
/// an error when that row is reached, not up front.
pub struct HecExportReader {
    records: csv::DeserializeRecordsIntoIter<Box<dyn Read>, SplunkHecToken>,
}

impl fmt::Debug for HecExportReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HecExportReader").finish_non_exhaustive()
    }
}

impl HecExportReader {
    /// Opens `path` for reading. Fails immediately if the file cannot be
    /// opened; row-level problems are reported during iteration.
    pub fn open(path: &Path) -> Result<Self, MigrateError> {
        let file = File::open(path).map_err(|e| MigrateError::FileAccess {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_reader(file))
    }

    /// Builds a reader over any byte source using the export dialect:
    /// comma delimiter, double-quote quoting, header row.
    pub fn from_reader<R: Read + 'static>(input: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .quote(b'"')
            .from_reader(Box::new(input) as Box<dyn Read>);

        HecExportReader {
            records: reader.into_deserialize(),
        }
    }
}

impl Iterator for HecExportReader {
    type Item = Result<SplunkHecToken, MigrateError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|r| r.map_err(MigrateError::from))
    }
}
