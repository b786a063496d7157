use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Export tree root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Export tree root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("Invalid redaction marker {0:?}: {1}")]
    InvalidMarker(String, &'static str),

    #[error("Stage '{stage}' requires '{previous}' to have completed first")]
    PreviousStageMissing {
        stage: &'static str,
        previous: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
