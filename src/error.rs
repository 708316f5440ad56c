use std::path::PathBuf;

use thiserror::Error;

use crate::models::ParseAttempt;

#[derive(Error, Debug)]
pub enum PainelError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid format: {} could not be read as a spreadsheet or delimited text ({})", .path.display(), summarize(.attempts))]
    UnparseableFormat {
        path: PathBuf,
        attempts: Vec<ParseAttempt>,
    },

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

fn summarize(attempts: &[ParseAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.format.label(), a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PainelError>;
