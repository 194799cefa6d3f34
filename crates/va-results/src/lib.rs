//! va-results: named result collections, CSV export and the run archive.

pub mod archive;
pub mod csv;
pub mod hash;
pub mod names;
pub mod store;
pub mod types;

pub use archive::RunArchive;
pub use hash::compute_sweep_id;
pub use store::ResultStore;
pub use types::*;

use std::path::PathBuf;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Result not found: {id}")]
    ResultNotFound { id: va_core::ResultId },

    #[error("Invalid path: {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },
}
