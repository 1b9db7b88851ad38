use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Fatal failure kinds for a migration run. Every variant aborts the run:
/// no retry, no catch-and-continue, no partial-success accounting.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The token export file could not be opened.
    #[error("cannot read token export {path:?}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A row (or the header) of the export did not match the expected
    /// seven-column layout.
    #[error("malformed token record: {0}")]
    MalformedRecord(#[from] csv::Error),

    /// The login exchange failed or did not yield a usable bearer token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Cribl answered a token POST with an error status. The response body
    /// is dumped separately at exit, so Display carries the status only.
    #[error("Cribl rejected the token ({status})")]
    Submission { status: StatusCode, body: String },

    /// Transport-level failure talking to Cribl.
    #[error("request to Cribl failed: {0}")]
    Http(#[from] reqwest::Error),
}
