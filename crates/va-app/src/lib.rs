//! Application service layer for driving VSPAERO sweeps.
//!
//! This crate gives the CLI one interface over settings management, sweep
//! orchestration, result querying and the run archive.

pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;
pub mod session;
pub mod sweep;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use progress::{SweepProgressEvent, SweepStage};
pub use project_service::{SettingsSummary, load_settings, save_settings, summarize, validate_settings};
pub use query::{CaseSummary, StoreSummary, history_summaries, slice_children, summarize_store, wrapper_children};
pub use run_service::{ArchiveOptions, archive_session, export_run_csv, list_runs, load_run};
pub use session::AeroSession;
