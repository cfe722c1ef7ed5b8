use thiserror::Error;

use crate::domain::models::WizardStage;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Nothing to import: the file needs a header line and at least one data line")]
    ParseEmpty,

    #[error("Unsupported file '{0}': expected a .csv or .txt file")]
    UnsupportedFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required fields are not mapped: {}", .0.join(", "))]
    MappingIncomplete(Vec<String>),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Column '{0}' is not present in the uploaded file")]
    UnknownHeader(String),

    #[error("No valid rows to import")]
    NoValidRows,

    #[error("Cannot {action} during the {stage} stage")]
    InvalidTransition {
        stage: WizardStage,
        action: &'static str,
    },

    #[error("{0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),
}
