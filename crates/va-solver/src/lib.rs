//! va-solver: launching and supervising the external solver and slicer.
//!
//! Contains:
//! - args (command-line construction)
//! - sink (where process output goes)
//! - control (shared kill/running flags)
//! - process (child process that is killed and reaped on drop)
//! - monitor (100 ms polling loop)

pub mod args;
pub mod control;
pub mod monitor;
pub mod process;
pub mod sink;

pub use args::{SolverArgs, command_line, executable_path, slicer_args};
pub use control::SolverControl;
pub use monitor::{DEFAULT_POLL, ProcessState, monitor, run_to_completion};
pub use process::ScopedProcess;
pub use sink::{ChannelSink, NullSink, OutputSink, TracingSink, WriterSink};

use std::path::PathBuf;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(thiserror::Error, Debug)]
pub enum SolverError {
    #[error("Failed to launch {program}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Another solver process is already running")]
    Busy,

    #[error("Process has no standard output pipe")]
    NoStdout,

    #[error("Failed waiting for process: {0}")]
    Wait(std::io::Error),

    #[error("Failed to kill process: {0}")]
    Kill(std::io::Error),
}
