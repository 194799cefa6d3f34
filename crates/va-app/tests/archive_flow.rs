use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use va_app::{
    AeroSession, AppError, ArchiveOptions, archive_session, export_run_csv, list_runs, load_run,
    load_settings, save_settings, summarize, validate_settings,
};
use va_project::SolverSettings;
use va_results::{ResultValue, RunArchive, names};
use va_setup::WaitPolicy;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

/// Session with one hand-built history case under a wrapper.
fn session_with_sweep(dir: &std::path::Path) -> AeroSession {
    let settings = SolverSettings::new("archived", dir.join("wing").display().to_string());
    let mut session = AeroSession::new(settings).with_wait_policy(WaitPolicy::immediate());
    let store = session.results_mut();
    let history = store.create(names::HISTORY);
    store.get_mut(history).unwrap().add("CL", vec![0.1, 0.2]);
    let wrapper = store.create(names::WRAPPER);
    store
        .get_mut(wrapper)
        .unwrap()
        .add("ResultsVec", ResultValue::StrVec(vec![history.to_string()]));
    session
}

#[test]
fn archived_run_round_trips() {
    let dir = unique_temp_dir("va_app_archive");
    let archive = RunArchive::new(dir.join("runs")).unwrap();
    let session = session_with_sweep(&dir);
    let options = ArchiveOptions {
        solver_version: "6.4.0".to_string(),
    };

    let manifest = archive_session(&session, &archive, &options).unwrap();
    assert_eq!(manifest.case_count, 1);
    assert_eq!(manifest.name, "archived");

    // Same settings and version replace the earlier entry.
    let again = archive_session(&session, &archive, &options).unwrap();
    assert_eq!(again.run_id, manifest.run_id);
    assert_eq!(list_runs(&archive).unwrap().len(), 1);

    let (loaded, store) = load_run(&archive, &manifest.run_id).unwrap();
    assert_eq!(loaded.run_id, manifest.run_id);
    assert_eq!(store.count(names::HISTORY), 1);

    let csv_path = dir.join("run.csv");
    export_run_csv(&archive, &manifest.run_id, &csv_path, WaitPolicy::immediate()).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("Results_Name,VSPAERO_History\n"));
    assert!(text.contains("CL,0.1,0.2"));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_run_is_reported() {
    let dir = unique_temp_dir("va_app_archive_missing");
    let archive = RunArchive::new(dir.join("runs")).unwrap();
    let err = load_run(&archive, "deadbeef").unwrap_err();
    assert!(matches!(err, AppError::RunNotFound(id) if id == "deadbeef"));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn archiving_without_sweep_fails() {
    let dir = unique_temp_dir("va_app_archive_empty");
    let archive = RunArchive::new(dir.join("runs")).unwrap();
    let session = AeroSession::new(SolverSettings::new("empty", "wing"));
    let err = archive_session(&session, &archive, &ArchiveOptions::default()).unwrap_err();
    assert!(matches!(err, AppError::CantFindName(_)));
    assert!(list_runs(&archive).unwrap().is_empty());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn settings_save_load_and_summarize() {
    let dir = unique_temp_dir("va_app_settings");
    let path = dir.join("wing.yaml");
    let mut settings = SolverSettings::new("wing", "/models/wing");
    settings.alpha.npts = 4;
    save_settings(&path, &settings).unwrap();

    let loaded = load_settings(&path).unwrap();
    validate_settings(&loaded).unwrap();
    let summary = summarize(&loaded);
    assert_eq!(summary.name, "wing");
    assert_eq!(summary.sweep_points, 4);
    assert!(summary.batch_mode);
    assert_eq!(summary.stability, None);

    assert!(matches!(load_settings(&dir.join("missing.yaml")), Err(AppError::InvalidInput(_))));
    assert!(matches!(
        validate_settings(&SolverSettings::new("x", "")),
        Err(AppError::NoModel)
    ));
    fs::remove_dir_all(&dir).ok();
}
