//! Error types shared by the fetch, store and export stages.

use thiserror::Error;

/// Errors that can occur while syncing, browsing or exporting the schedule.
#[derive(Debug, Error, Clone)]
pub enum ScheduleError {
    /// A raw entry is missing a required field or carries one of the wrong type
    #[error("Malformed schedule entry{}: {message}", id_suffix(.id))]
    MalformedRecord { id: Option<i64>, message: String },

    /// The SQLite store could not be opened, read or written
    #[error("Schedule store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// The remote call failed at the transport level
    #[error("HEMIS unreachable: {message}")]
    RemoteUnavailable { message: String },

    /// HEMIS answered with a non-200 status
    #[error("HEMIS returned status {status}")]
    RemoteStatus { status: u16 },

    /// HEMIS answered 200 but the body had an unexpected shape
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// The spreadsheet could not be written
    #[error("Export failed: {message}")]
    Export { message: String },

    /// Configuration is missing or invalid
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

fn id_suffix(id: &Option<i64>) -> String {
    id.map(|id| format!(" (id {id})")).unwrap_or_default()
}

impl ScheduleError {
    /// Returns true if the error came from talking to HEMIS.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ScheduleError::RemoteUnavailable { .. }
                | ScheduleError::RemoteStatus { .. }
                | ScheduleError::UnexpectedResponse { .. }
        )
    }

    /// Returns true if the error means the local store or export path is broken, as opposed to
    /// a bad upstream answer. These are the failures an operator has to act on.
    pub fn is_fatal_for_store(&self) -> bool {
        matches!(
            self,
            ScheduleError::StoreUnavailable { .. } | ScheduleError::Export { .. }
        )
    }
}

impl From<reqwest::Error> for ScheduleError {
    fn from(err: reqwest::Error) -> Self {
        ScheduleError::RemoteUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for ScheduleError {
    fn from(err: rusqlite::Error) -> Self {
        ScheduleError::StoreUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ScheduleError {
    fn from(err: url::ParseError) -> Self {
        ScheduleError::Config {
            message: format!("invalid base URL: {err}"),
        }
    }
}
