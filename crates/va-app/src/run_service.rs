//! Archiving completed sweeps and reading them back.

use std::path::Path;

use tracing::info;
use va_results::{RunArchive, RunManifest, ResultStore, compute_sweep_id, csv};
use va_setup::{WaitPolicy, wait_for_file};

use crate::error::AppResult;
use crate::query;
use crate::session::AeroSession;

/// Options for archiving a sweep.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub solver_version: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            solver_version: "unknown".to_string(),
        }
    }
}

/// Save the session's result store under a content hash of its settings.
///
/// A sweep with identical settings and solver version replaces the earlier
/// archive entry.
pub fn archive_session(
    session: &AeroSession,
    archive: &RunArchive,
    options: &ArchiveOptions,
) -> AppResult<RunManifest> {
    let settings = session.to_settings();
    let run_id = compute_sweep_id(&settings, &options.solver_version);
    let case_count = query::wrapper_children(session.results())?.len();

    let manifest = RunManifest {
        run_id: run_id.clone(),
        name: settings.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        model_base: settings.model.base.clone(),
        analysis_method: settings.analysis_method,
        case_count,
        solver_version: options.solver_version.clone(),
    };

    if archive.has_run(&run_id) {
        info!(run_id = %run_id, "replacing archived run");
        archive.delete_run(&run_id)?;
    }
    archive.save_run(&manifest, session.results())?;
    info!(run_id = %run_id, cases = case_count, "sweep archived");
    Ok(manifest)
}

pub fn list_runs(archive: &RunArchive) -> AppResult<Vec<RunManifest>> {
    Ok(archive.list_runs()?)
}

pub fn load_run(archive: &RunArchive, run_id: &str) -> AppResult<(RunManifest, ResultStore)> {
    let manifest = archive.load_manifest(run_id)?;
    let store = archive.load_results(run_id)?;
    Ok((manifest, store))
}

/// Write the latest sweep of an archived run to CSV.
pub fn export_run_csv(archive: &RunArchive, run_id: &str, path: &Path, wait: WaitPolicy) -> AppResult<()> {
    let store = archive.load_results(run_id)?;
    let children = query::wrapper_children(&store)?;
    csv::write_csv(&store, &children, path)?;
    wait_for_file(path, wait)?;
    Ok(())
}
