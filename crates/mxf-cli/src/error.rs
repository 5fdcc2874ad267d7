//! CLI error taxonomy, mapped to exit codes in `main` (§6.3).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("unknown essence type {0:?} (expected one of jp2k, jxs, aces, pcm, iab, isxd, timed-text)")]
    UnknownEssenceType(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Essence(#[from] mxf_essence::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 3,
            CliError::UnknownEssenceType(_) => 5,
            CliError::Io(_) | CliError::Essence(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
