//! Polling loop that streams output and watches for a kill request.

use std::path::Path;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::{OutputSink, ScopedProcess, SolverControl, SolverError, SolverResult};

/// Liveness and output poll interval.
pub const DEFAULT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessState {
    #[default]
    Idle,
    Running,
    /// Exited on its own and all output was delivered. `code` is `None`
    /// when a signal ended the process.
    Completed { code: Option<i32> },
    Killed,
}

impl ProcessState {
    pub fn is_killed(self) -> bool {
        self == Self::Killed
    }
}

/// Stream output into `sink` until the process finishes or a kill is requested.
///
/// The kill flag is checked once per poll iteration. It is left set so the
/// caller can observe it too; clearing it is the caller's job.
pub fn monitor(
    process: &mut ScopedProcess,
    sink: &mut dyn OutputSink,
    control: &SolverControl,
    poll: Duration,
) -> SolverResult<ProcessState> {
    let mut output_open = true;
    loop {
        if control.is_kill_requested() {
            process.kill()?;
            info!(program = %process.program().display(), "solver killed on request");
            return Ok(ProcessState::Killed);
        }

        if output_open {
            match process.recv_timeout(poll) {
                Ok(line) => {
                    sink.line(&line);
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => output_open = false,
            }
        } else {
            thread::sleep(poll);
        }

        if !output_open && let Some(status) = process.try_wait()? {
            debug!(program = %process.program().display(), ?status, "process exited");
            return Ok(ProcessState::Completed {
                code: status.code(),
            });
        }
    }
}

/// Clears the running flag on every exit path.
struct RunningGuard<'a>(&'a SolverControl);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Launch, stream and reap one process.
///
/// Fails with [`SolverError::Busy`] when another run holds `control`.
pub fn run_to_completion(
    program: &Path,
    args: &[String],
    dir: Option<&Path>,
    sink: &mut dyn OutputSink,
    control: &SolverControl,
    poll: Duration,
) -> SolverResult<ProcessState> {
    if !control.try_begin() {
        return Err(SolverError::Busy);
    }
    let _running = RunningGuard(control);

    let mut process = ScopedProcess::spawn_in(program, args, dir)?;
    monitor(&mut process, sink, control, poll)
}
