use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use va_core::AnalysisMethod;
use va_results::{ResultStore, RunArchive, RunManifest, csv};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn sample_store() -> ResultStore {
    let mut store = ResultStore::new();
    let history = store.create("VSPAERO_History");
    store
        .get_mut(history)
        .unwrap()
        .add("CL", vec![0.1, 0.2, 0.3]);
    let wrapper = store.create("VSPAERO_Wrapper");
    store
        .get_mut(wrapper)
        .unwrap()
        .add("ResultsVec", vec![history.to_string()]);
    store
}

fn manifest(run_id: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        name: "wing".to_string(),
        timestamp: timestamp.to_string(),
        model_base: "/tmp/wing".to_string(),
        analysis_method: AnalysisMethod::VortexLattice,
        case_count: 1,
        solver_version: "0.1.0".to_string(),
    }
}

#[test]
fn save_list_load_roundtrip() {
    let project_dir = unique_temp_dir("va_results_project");
    fs::create_dir_all(&project_dir).expect("failed to create temp project dir");
    let settings_path = project_dir.join("wing.yaml");

    let archive = RunArchive::for_settings(&settings_path).expect("failed to create archive");
    let store = sample_store();

    archive
        .save_run(&manifest("run-b", "2026-02-27T00:00:00Z"), &store)
        .expect("failed to save run");
    archive
        .save_run(&manifest("run-a", "2026-02-26T00:00:00Z"), &store)
        .expect("failed to save run");

    let runs = archive.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, "run-a");
    assert!(archive.has_run("run-b"));

    let loaded = archive.load_results("run-b").expect("failed to load results");
    assert_eq!(loaded.len(), 2);
    let history = loaded.find_latest("VSPAERO_History").unwrap();
    assert_eq!(
        loaded.get(history).unwrap().f64_slice("CL"),
        Some(&[0.1, 0.2, 0.3][..])
    );

    // Ids survive persistence, so wrapper references still resolve.
    let wrapper = loaded.find_latest("VSPAERO_Wrapper").unwrap();
    let children = loaded.get(wrapper).unwrap().str_slice("ResultsVec").unwrap();
    assert_eq!(children[0], history.to_string());

    archive.delete_run("run-b").expect("failed to delete run");
    assert!(!archive.has_run("run-b"));
    assert!(archive.load_manifest("run-b").is_err());

    fs::remove_dir_all(&project_dir).ok();
}

#[test]
fn csv_export_to_disk() {
    let dir = unique_temp_dir("va_results_csv");
    fs::create_dir_all(&dir).unwrap();
    let store = sample_store();
    let ids = store.ids_for("VSPAERO_History");
    let path = dir.join("out.csv");
    csv::write_csv(&store, &ids, &path).expect("failed to write csv");

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Results_Name,VSPAERO_History\n"));
    assert!(text.contains("CL,0.1,0.2,0.3\n"));
    assert!(!text.contains("VSPAERO_Wrapper"));

    fs::remove_dir_all(&dir).ok();
}
