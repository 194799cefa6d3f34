use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use va_core::{AnalysisMethod, FlowCondition, StabilityType};
use va_parse::header::CASE_SENTINEL_LEN;
use va_parse::scanner::TABLE_DELIMITERS;
use va_parse::{HistoryParser, LoadParser, ParseError, ResultFileParser, RowScanner, StabParser};
use va_results::ResultStore;

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

fn case_header(extra: &str) -> String {
    format!(
        "{}\nSref_ : 100.000000 Lunit^2\nCref_ : 2.000000 Lunit\nBref_ : 10.000000 Lunit\n\
         Mach_ : 0.300000 no_unit\nAoA_ : 2.000000 deg\nBeta_ : 0.000000 deg\n{extra}\n",
        "*".repeat(CASE_SENTINEL_LEN)
    )
}

#[test]
fn history_and_load_end_to_end() {
    let dir = unique_temp_dir("va_parse_e2e");
    let history = dir.join("wing.history");
    let load = dir.join("wing.lod");

    fs::write(
        &history,
        case_header("")
            + "  Iter      Mach       AoA      Beta       CL         CDo       CDi      CDtot      CS        L/D        E        CFx       CFy       CFz       CMx       CMy       CMz       T/QS\n"
            + "     1   0.30000   2.00000   0.00000   0.03329   0.00364   0.00009   0.00373  -0.00000   8.93773 395.42033  -0.00049  -0.00000   0.03329  -0.00000  -0.09836  -0.00000   0.00000\n"
            + "     2   0.30000   2.00000   0.00000   0.03330   0.00364   0.00009   0.00373  -0.00000   8.93494 394.87228  -0.00049  -0.00000   0.03328  -0.00000  -0.09834  -0.00000   0.00000\n",
    )
    .unwrap();
    fs::write(
        &load,
        case_header("")
            + "Wing      S      Yavg     Chord     V/Vinf    Cl        Cd        Cs        Cx        Cy        Cz        Cmx       Cmy       Cmz\n"
            + "1   0.25   0.5   1.0   1.0   0.5   0.01   0.0   0.0   0.0   0.5   0.0   -0.02   0.0\n",
    )
    .unwrap();

    let mut store = ResultStore::new();
    let mut ids = Vec::new();
    HistoryParser::new(AnalysisMethod::VortexLattice)
        .read_file(&history, &mut store, &mut ids)
        .unwrap();
    LoadParser::new(AnalysisMethod::VortexLattice)
        .read_file(&load, &mut store, &mut ids)
        .unwrap();
    assert_eq!(ids.len(), 2);

    let hist = store.get(ids[0]).unwrap();
    assert_eq!(hist.f64_slice("CL"), Some(&[0.03329, 0.03330][..]));
    assert_eq!(hist.f64_slice("L/D").map(<[f64]>::len), Some(2));
    assert_eq!(
        hist.header.map(|h| h.flow),
        Some(FlowCondition::new(0.3, 2.0, 0.0))
    );

    let lod = store.get(ids[1]).unwrap();
    assert_eq!(lod.f64("FC_Cref_"), Some(2.0));
    assert_eq!(lod.f64_slice("cl*c/cref"), Some(&[0.25][..]));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = unique_temp_dir("va_parse_missing");
    let mut store = ResultStore::new();
    let mut ids = Vec::new();
    let err = HistoryParser::new(AnalysisMethod::VortexLattice)
        .read_file(&dir.join("absent.history"), &mut store, &mut ids)
        .unwrap_err();
    assert!(matches!(err, ParseError::Open { what: "history", .. }));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn stab_default_table_with_control_groups() {
    let text = case_header("")
        + "# Result         Value     Units\n"
        + "SM               0.12      no_unit\n"
        + "#\n"
        + "Coef     Total     Alpha     Beta    ConGrp_1    ConGrp_2\n"
        + "CL       0.50      4.60      0.00    0.010       0.300\n"
        + "CMy     -0.10     -1.20      0.00    0.001      -1.100\n";
    let mut rows = RowScanner::new(std::io::Cursor::new(text.into_bytes()), TABLE_DELIMITERS);
    let mut store = ResultStore::new();
    let mut ids = Vec::new();
    StabParser::new(
        AnalysisMethod::VortexLattice,
        StabilityType::Default,
        vec!["Aileron".to_string(), "Elevator".to_string()],
    )
    .parse(&mut rows, &mut store, &mut ids)
    .unwrap();

    let rec = store.get(ids[0]).unwrap();
    assert_eq!(rec.f64("SM"), Some(0.12));
    assert_eq!(rec.f64("CL_Alpha"), Some(4.6));
    assert_eq!(rec.f64("CL_Aileron"), Some(0.01));
    assert_eq!(rec.f64("CMy_Elevator"), Some(-1.1));
    assert_eq!(rec.i64("AnalysisMethod"), Some(0));
}
