//! Model file naming and filesystem waits.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::debug;
use va_core::AnalysisMethod;

use crate::{SetupError, SetupResult};

/// Every file the solver reads or writes for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    /// Model path without extension, passed to the solver and slicer.
    pub base: PathBuf,
    pub method: AnalysisMethod,
    pub degen_geom: PathBuf,
    /// Triangulated mesh; panel method only.
    pub comp_geom: Option<PathBuf>,
    pub setup: PathBuf,
    pub adb: PathBuf,
    pub history: PathBuf,
    pub load: PathBuf,
    pub stab: PathBuf,
    pub cuts: PathBuf,
    pub slice: PathBuf,
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

impl ModelFiles {
    pub fn new(base: impl AsRef<Path>, method: AnalysisMethod) -> Self {
        let base = base.as_ref().to_path_buf();
        let (degen_geom, comp_geom) = match method {
            AnalysisMethod::VortexLattice => (with_suffix(&base, ".csv"), None),
            AnalysisMethod::Panel => (
                with_suffix(&base, "_DegenGeom.csv"),
                Some(with_suffix(&base, ".tri")),
            ),
        };
        Self {
            setup: with_suffix(&base, ".vspaero"),
            adb: with_suffix(&base, ".adb"),
            history: with_suffix(&base, ".history"),
            load: with_suffix(&base, ".lod"),
            stab: with_suffix(&base, ".stab"),
            cuts: with_suffix(&base, ".cuts"),
            slice: with_suffix(&base, ".slc"),
            degen_geom,
            comp_geom,
            method,
            base,
        }
    }

    /// Solver outputs that must not survive into the next run.
    pub fn solver_outputs(&self) -> [&Path; 4] {
        [&self.adb, &self.history, &self.load, &self.stab]
    }

    pub fn base_arg(&self) -> String {
        self.base.to_string_lossy().into_owned()
    }
}

/// Bounded polling used while waiting for a file to appear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub max_polls: u32,
    /// Extra sleep after polling ends, for writers still flushing.
    pub grace: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_polls: 50,
            grace: Duration::from_millis(100),
        }
    }
}

impl WaitPolicy {
    /// No sleeping at all; checks existence once.
    pub fn immediate() -> Self {
        Self {
            interval: Duration::ZERO,
            max_polls: 0,
            grace: Duration::ZERO,
        }
    }
}

/// Poll until `path` exists or the policy runs out.
pub fn wait_for_file(path: &Path, policy: WaitPolicy) -> SetupResult<()> {
    let mut polls = 0;
    while !path.exists() && polls < policy.max_polls {
        polls += 1;
        thread::sleep(policy.interval);
    }
    if !policy.grace.is_zero() {
        thread::sleep(policy.grace);
    }

    if path.exists() {
        debug!(path = %path.display(), polls, "file present");
        Ok(())
    } else {
        Err(SetupError::FileDoesNotExist {
            path: path.to_path_buf(),
        })
    }
}

pub fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
