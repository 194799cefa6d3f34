//! Solver setup file and slicer cuts file.
//!
//! Both formats are read positionally by the external tools, so line order
//! and number formatting are fixed.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, warn};
use va_core::{AnalysisMethod, format_g, format_lf};
use va_project::SolverSettings;

use crate::controls::ControlGroupTable;
use crate::files::{WaitPolicy, remove_if_exists, wait_for_file};
use crate::rotors::RotorDiskTable;
use crate::slices::CpSliceList;
use crate::sweep::SweepVectors;
use crate::{SetupError, SetupResult};

/// Everything the setup file is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct DeckInputs<'a> {
    pub settings: &'a SolverSettings,
    /// Full sweep; only the first value of each axis is written outside
    /// batch mode.
    pub sweep: &'a SweepVectors,
    pub rotors: &'a RotorDiskTable,
    pub groups: &'a ControlGroupTable,
}

fn push_list(out: &mut String, key: &str, values: &[f64]) {
    let joined = values
        .iter()
        .map(|v| format_lf(*v))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "{key} = {joined} ");
}

fn push_value(out: &mut String, key: &str, value: f64) {
    let _ = writeln!(out, "{key} = {} ", format_lf(value));
}

fn no_spaces(name: &str) -> String {
    name.replace(' ', "_")
}

/// Render the setup file text.
pub fn render_setup(inputs: &DeckInputs<'_>) -> String {
    let s = inputs.settings;
    let mut out = String::new();

    push_value(&mut out, "Sref", s.reference.sref);
    push_value(&mut out, "Cref", s.reference.cref);
    push_value(&mut out, "Bref", s.reference.bref);
    push_value(&mut out, "X_cg", s.cg[0]);
    push_value(&mut out, "Y_cg", s.cg[1]);
    push_value(&mut out, "Z_cg", s.cg[2]);

    let sweep = if s.case.batch_mode {
        inputs.sweep.clone()
    } else {
        inputs.sweep.first_only()
    };
    push_list(&mut out, "Mach", &sweep.mach);
    push_list(&mut out, "AoA", &sweep.alpha);
    push_list(&mut out, "Beta", &sweep.beta);

    let adv = &s.advanced;
    push_value(&mut out, "Vinf", s.freestream.vinf);
    push_value(&mut out, "Rho", s.freestream.rho);
    push_value(&mut out, "ReCref", s.freestream.re_cref);
    push_value(&mut out, "ClMax", adv.cl_max.unwrap_or(-1.0));
    push_value(&mut out, "MaxTurningAngle", adv.max_turn_angle.unwrap_or(-1.0));
    let _ = writeln!(out, "Symmetry = {} ", if adv.symmetry { "Y" } else { "NO" });
    push_value(&mut out, "FarDist", adv.far_dist.unwrap_or(-1.0));
    let _ = writeln!(out, "NumWakeNodes = {} ", s.case.num_wake_nodes());
    let _ = writeln!(out, "WakeIters = {} ", s.case.wake_iterations);

    let rotors: Vec<_> = inputs.rotors.used().collect();
    let _ = writeln!(out, "NumberOfRotors = {} ", rotors.len());
    for (i, disk) in rotors.iter().enumerate() {
        let n = i + 1;
        let _ = writeln!(out, "PropElement_{n}");
        let _ = writeln!(out, "{n}");
        let p = &disk.position;
        let d = &disk.normal;
        let _ = writeln!(out, "{} {} {} ", format_lf(p.x), format_lf(p.y), format_lf(p.z));
        let _ = writeln!(out, "{} {} {} ", format_lf(d.x), format_lf(d.y), format_lf(d.z));
        for v in [disk.radius(), disk.hub_radius(), disk.rpm, disk.ct, disk.cp] {
            let _ = writeln!(out, "{} ", format_lf(v));
        }
    }

    // Control surfaces are not supported by the panel solver.
    let groups: Vec<_> = match s.analysis_method {
        AnalysisMethod::Panel => Vec::new(),
        AnalysisMethod::VortexLattice => inputs.groups.active_groups().collect(),
    };
    let _ = writeln!(out, "NumberOfControlGroups = {} ", groups.len());
    for group in groups {
        let _ = writeln!(out, "{}", no_spaces(&group.name));
        let names = group
            .members()
            .iter()
            .map(|m| no_spaces(&m.full_name))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{names}");
        let gains = group
            .members()
            .iter()
            .map(|m| format_g(m.gain))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "{gains}");
        let _ = writeln!(out, "{}", format_g(group.deflection));
    }

    let _ = writeln!(out, "Preconditioner = {} ", adv.preconditioner.deck_name());
    let _ = writeln!(
        out,
        "Karman-Tsien Correction = {} ",
        if adv.kt_correction { "Y" } else { "N" }
    );
    out
}

/// Render the cuts file: the slice count, then one `<axis> <position>` line
/// per slice.
pub fn render_cuts(slices: &CpSliceList) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", slices.len());
    for slice in slices.iter() {
        let _ = writeln!(out, "{} {}", slice.axis.cuts_char(), format_lf(slice.position));
    }
    out
}

fn replace_file(path: &Path, what: &'static str, content: &str, wait: WaitPolicy) -> SetupResult<()> {
    remove_if_exists(path).map_err(|source| SetupError::Create {
        what,
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(|source| SetupError::Create {
        what,
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "{what} file written");

    wait_for_file(path, wait).inspect_err(|_| {
        warn!(path = %path.display(), "{what} file not visible after waiting");
    })
}

/// Replace the setup file at `path` and wait until it is visible.
pub fn write_setup_file(path: &Path, inputs: &DeckInputs<'_>, wait: WaitPolicy) -> SetupResult<()> {
    replace_file(path, "setup", &render_setup(inputs), wait)
}

/// Replace the cuts file at `path` and wait until it is visible.
pub fn write_cuts_file(path: &Path, slices: &CpSliceList, wait: WaitPolicy) -> SetupResult<()> {
    replace_file(path, "cuts", &render_cuts(slices), wait)
}
