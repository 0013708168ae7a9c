//! Error types for the fallible edges of the crate
//!
//! The simulation itself never fails. Loading constants and persisting
//! results can, and they report through [`Error`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open constants table {path}: {source}")]
    ConstantsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed constants table: {0}")]
    Csv(#[from] csv::Error),

    #[error("constant {name} = {value} is outside [0, 1]")]
    ConstantOutOfRange { name: String, value: f64 },

    #[error("result store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode or decode result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid scenario key {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
