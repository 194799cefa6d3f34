use std::path::PathBuf;

use va_core::{AnalysisMethod, CutAxis};
use va_project::{SolverSettings, SubSurfaceDef};
use va_setup::{
    ControlGroupTable, CpSliceList, DeckInputs, RotorDisk, RotorDiskTable, SweepVectors,
    WaitPolicy, write_cuts_file, write_setup_file,
};

fn unique_temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("va_setup_{name}_{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn two_rotors() -> RotorDiskTable {
    let mut rotors = RotorDiskTable::new();
    rotors.add(RotorDisk {
        name: "Left".to_string(),
        diameter: 6.0,
        hub_diameter: 1.0,
        ..RotorDisk::default()
    });
    rotors.add(RotorDisk {
        name: "Right".to_string(),
        ..RotorDisk::default()
    });
    rotors.add(RotorDisk {
        name: "Spare".to_string(),
        used: false,
        ..RotorDisk::default()
    });
    rotors
}

fn one_used_group() -> ControlGroupTable {
    let mut groups = ControlGroupTable::new();
    groups.refresh_from_geometry(&[SubSurfaceDef {
        geom_id: "WING".to_string(),
        geom_name: "Main Wing".to_string(),
        ss_id: "AIL".to_string(),
        ss_name: "Aileron".to_string(),
        num_symm_copies: 2,
    }]);
    groups.add_group_named("Roll Control");
    groups.add_all_to_current().unwrap();
    let id = groups.current().unwrap();
    groups.get_mut(id).unwrap().set_gain(1, -1.0).unwrap();
    groups.get_mut(id).unwrap().deflection = 5.0;
    // Empty groups are never written.
    groups.add_group_named("Empty");
    groups
}

#[test]
fn deck_with_rotors_and_one_group() {
    let dir = unique_temp_dir("deck");
    let path = dir.join("model.vspaero");
    std::fs::write(&path, "stale").unwrap();

    let settings = SolverSettings::new("deck", dir.join("model").to_string_lossy());
    let sweep = SweepVectors::from_settings(&settings);
    let rotors = two_rotors();
    let groups = one_used_group();
    let inputs = DeckInputs {
        settings: &settings,
        sweep: &sweep,
        rotors: &rotors,
        groups: &groups,
    };
    write_setup_file(&path, &inputs, WaitPolicy::immediate()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("stale"));
    assert!(text.contains("NumberOfRotors = 2 \n"));
    assert!(text.contains("NumberOfControlGroups = 1 \n"));
    assert_eq!(text.matches("PropElement_").count(), 2);
    assert!(text.contains("PropElement_1\n1\n"));
    assert!(text.contains("PropElement_2\n2\n"));
    assert!(text.contains("3.000000 \n0.500000 \n2000.000000 \n"));
    assert!(text.contains(
        "Roll_Control\nMain_Wing_Surf0_Aileron,Main_Wing_Surf1_Aileron\n1, -1\n5\n"
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn panel_method_writes_no_control_groups() {
    let dir = unique_temp_dir("panel");
    let path = dir.join("model.vspaero");

    let mut settings = SolverSettings::new("panel", dir.join("model").to_string_lossy());
    settings.analysis_method = AnalysisMethod::Panel;
    let sweep = SweepVectors::from_settings(&settings);
    let rotors = two_rotors();
    let groups = one_used_group();
    let inputs = DeckInputs {
        settings: &settings,
        sweep: &sweep,
        rotors: &rotors,
        groups: &groups,
    };
    write_setup_file(&path, &inputs, WaitPolicy::immediate()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("NumberOfControlGroups = 0 \n"));
    assert!(!text.contains("Roll_Control"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn cuts_file_written() {
    let dir = unique_temp_dir("cuts");
    let path = dir.join("model.cuts");
    let mut slices = CpSliceList::new();
    slices.add_positions(CutAxis::Y, &[0.0, 2.5]);
    write_cuts_file(&path, &slices, WaitPolicy::immediate()).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "2\ny 0.000000\ny 2.500000\n"
    );
    std::fs::remove_dir_all(&dir).ok();
}
