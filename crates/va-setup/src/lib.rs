//! va-setup: everything written before the solver runs.
//!
//! Sweep enumeration, model file naming, the setup and cuts files, and the
//! control-surface group, rotor disk and Cp slice collections they draw on.

pub mod controls;
pub mod deck;
pub mod files;
pub mod rotors;
pub mod slices;
pub mod sweep;

pub use controls::{ControlGroup, ControlGroupTable, ControlSurface, MemberKey};
pub use deck::{DeckInputs, render_cuts, render_setup, write_cuts_file, write_setup_file};
pub use files::{ModelFiles, WaitPolicy, remove_if_exists, wait_for_file};
pub use rotors::{RotorDisk, RotorDiskTable};
pub use slices::{CpSlice, CpSliceList};
pub use sweep::{SweepRange, SweepVectors};

use std::path::PathBuf;

pub type SetupResult<T> = Result<T, SetupError>;

#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error("Unable to create {what} file: {path}")]
    Create {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed writing {path}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File does not exist: {path}")]
    FileDoesNotExist { path: PathBuf },

    #[error("No current control surface group")]
    NoCurrentGroup,

    #[error("Index out of range: {what} (index={index}, len={len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
