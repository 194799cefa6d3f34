//! Solver and slicer command lines.

use std::path::{Path, PathBuf};

use va_core::format_lf;
use va_project::{ModelDef, SolverSettings};

/// Ordered argument vector for one solver invocation.
///
/// A single-point run passes one value per freestream slot; a batch run
/// passes the full sweep vectors and the solver iterates internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverArgs {
    args: Vec<String>,
}

fn push_slot(args: &mut Vec<String>, values: &[f64], precision: usize) {
    args.extend(values.iter().map(|v| format!("{v:.precision$}")));
    args.push("END".to_string());
}

impl SolverArgs {
    pub fn build(settings: &SolverSettings, mach: &[f64], alpha: &[f64], beta: &[f64]) -> Self {
        let mut args = vec!["-fs".to_string()];
        push_slot(&mut args, mach, 2);
        push_slot(&mut args, alpha, 3);
        push_slot(&mut args, beta, 3);

        args.push("-omp".to_string());
        args.push(settings.case.ncpu.to_string());

        if settings.stability.enabled {
            args.push(settings.stability.kind.flag().to_string());
        }

        let advanced = &settings.advanced;
        if advanced.from_steady_state {
            args.push("-fromsteadystate".to_string());
        }
        if settings.case.wake_avg_start_iter >= 1 {
            args.push("-avg".to_string());
            args.push(settings.case.wake_avg_start_iter.to_string());
        }
        if settings.case.wake_skip_until_iter >= 1 {
            args.push("-nowake".to_string());
            args.push(settings.case.wake_skip_until_iter.to_string());
        }
        if let Some(height) = advanced.ground_height {
            args.push("-groundheight".to_string());
            args.push(format_lf(height));
        }
        if advanced.write_2d_fem {
            args.push("-write2dfem".to_string());
        }
        if let Some(flag) = advanced.preconditioner.flag() {
            args.push(flag.to_string());
        }
        if advanced.kt_correction {
            args.push("-dokt".to_string());
        }

        // Model base name goes last.
        args.push(settings.model.base.clone());

        Self { args }
    }

    /// One sweep point.
    pub fn single(settings: &SolverSettings, mach: f64, alpha: f64, beta: f64) -> Self {
        Self::build(settings, &[mach], &[alpha], &[beta])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }
}

/// The slicer reads the cuts file next to the model and takes only the base name.
pub fn slicer_args(model_base: &str) -> Vec<String> {
    vec![model_base.to_string()]
}

/// Executable path, joined onto the configured directory when there is one.
pub fn executable_path(model: &ModelDef, exe_name: &str) -> PathBuf {
    match model.exe_dir.as_deref() {
        Some(dir) if !dir.is_empty() => Path::new(dir).join(exe_name),
        _ => PathBuf::from(exe_name),
    }
}

/// Printable command line, newline terminated.
pub fn command_line(program: &Path, args: &[String]) -> String {
    let mut out = program.display().to_string();
    for arg in args {
        out.push(' ');
        out.push_str(arg);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use va_core::{Preconditioner, StabilityType};

    fn settings() -> SolverSettings {
        SolverSettings::new("t", "/work/plane")
    }

    #[test]
    fn minimal_single_point() {
        let args = SolverArgs::single(&settings(), 0.3, 2.0, 0.0);
        assert_eq!(
            args.as_slice(),
            [
                "-fs", "0.30", "END", "2.000", "END", "0.000", "END", "-omp", "4", "/work/plane"
            ]
        );
    }

    #[test]
    fn every_option_in_order() {
        let mut s = settings();
        s.case.ncpu = 8;
        s.case.wake_avg_start_iter = 3;
        s.case.wake_skip_until_iter = 2;
        s.stability.enabled = true;
        s.stability.kind = StabilityType::QAnalysis;
        s.advanced.from_steady_state = true;
        s.advanced.ground_height = Some(1.5);
        s.advanced.write_2d_fem = true;
        s.advanced.preconditioner = Preconditioner::Ssor;
        s.advanced.kt_correction = true;

        let args = SolverArgs::single(&s, 0.5, -1.0, 2.5).into_vec();
        assert_eq!(
            args,
            [
                "-fs",
                "0.50",
                "END",
                "-1.000",
                "END",
                "2.500",
                "END",
                "-omp",
                "8",
                "-qstab",
                "-fromsteadystate",
                "-avg",
                "3",
                "-nowake",
                "2",
                "-groundheight",
                "1.500000",
                "-write2dfem",
                "-ssor",
                "-dokt",
                "/work/plane",
            ]
        );
    }

    #[test]
    fn batch_slots_hold_full_vectors() {
        let args = SolverArgs::build(&settings(), &[0.1, 0.2], &[0.0, 5.0, 10.0], &[0.0]);
        let a = args.as_slice();
        assert_eq!(
            &a[..10],
            ["-fs", "0.10", "0.20", "END", "0.000", "5.000", "10.000", "END", "0.000", "END"]
        );
    }

    #[test]
    fn stability_flag_only_when_enabled() {
        let mut s = settings();
        s.stability.kind = StabilityType::PAnalysis;
        assert!(!SolverArgs::single(&s, 0.0, 0.0, 0.0).as_slice().contains(&"-pstab".to_string()));
        s.stability.enabled = true;
        assert!(SolverArgs::single(&s, 0.0, 0.0, 0.0).as_slice().contains(&"-pstab".to_string()));
    }

    #[test]
    fn exe_dir_is_joined() {
        let mut model = ModelDef::new("/work/plane");
        assert_eq!(executable_path(&model, "vspaero"), PathBuf::from("vspaero"));
        model.exe_dir = Some("/opt/vsp".to_string());
        assert_eq!(executable_path(&model, "vspaero"), PathBuf::from("/opt/vsp/vspaero"));
    }

    #[test]
    fn pretty_command() {
        let line = command_line(Path::new("vspslicer"), &slicer_args("/work/plane"));
        assert_eq!(line, "vspslicer /work/plane\n");
    }
}
