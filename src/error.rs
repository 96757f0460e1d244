use std::fmt::{self, Display};
use std::io;

/// Provides `EpinetError` and maps other errors to
/// convert to an `EpinetError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpinetError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    ReportError(String),
    /// An edge referenced a node name absent from the node set.
    UnknownNode(String),
    /// An edge connected a node to itself.
    SelfLoop(String),
    EpinetError(String),
}

impl From<io::Error> for EpinetError {
    fn from(error: io::Error) -> Self {
        EpinetError::IoError(error)
    }
}

impl From<serde_json::Error> for EpinetError {
    fn from(error: serde_json::Error) -> Self {
        EpinetError::JsonError(error)
    }
}

impl From<csv::Error> for EpinetError {
    fn from(error: csv::Error) -> Self {
        EpinetError::CsvError(error)
    }
}

impl From<String> for EpinetError {
    fn from(error: String) -> Self {
        EpinetError::EpinetError(error)
    }
}

impl From<&str> for EpinetError {
    fn from(error: &str) -> Self {
        EpinetError::EpinetError(error.to_string())
    }
}

impl std::error::Error for EpinetError {}

impl Display for EpinetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {self:?}")?;
        Ok(())
    }
}
