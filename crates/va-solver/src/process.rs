//! Child process with a piped standard output.
//!
//! A reader thread splits the output into lines, treating a bare carriage
//! return as a line break (the solver redraws progress lines with `\r`).
//! Dropping the handle kills a still-running child and reaps it.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::{SolverError, SolverResult};

pub struct ScopedProcess {
    program: PathBuf,
    child: Child,
    lines: Receiver<String>,
    reader: Option<JoinHandle<()>>,
    reaped: bool,
}

impl ScopedProcess {
    pub fn spawn(program: &Path, args: &[String]) -> SolverResult<Self> {
        Self::spawn_in(program, args, None)
    }

    /// Spawn with an optional working directory.
    pub fn spawn_in(program: &Path, args: &[String], dir: Option<&Path>) -> SolverResult<Self> {
        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::inherit());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| SolverError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SolverError::NoStdout);
        };

        let (tx, rx) = channel();
        let reader = thread::spawn(move || read_lines(stdout, tx));
        debug!(program = %program.display(), pid = child.id(), "process started");

        Ok(Self {
            program: program.to_path_buf(),
            child,
            lines: rx,
            reader: Some(reader),
            reaped: false,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Next output line. `Disconnected` means the output pipe is closed
    /// and every line has been delivered.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<String, RecvTimeoutError> {
        self.lines.recv_timeout(timeout)
    }

    pub fn try_wait(&mut self) -> SolverResult<Option<ExitStatus>> {
        let status = self.child.try_wait().map_err(SolverError::Wait)?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    pub fn wait(&mut self) -> SolverResult<ExitStatus> {
        let status = self.child.wait().map_err(SolverError::Wait)?;
        self.reaped = true;
        Ok(status)
    }

    /// Kill and reap. Killing an already exited child is not an error.
    pub fn kill(&mut self) -> SolverResult<()> {
        if self.try_wait()?.is_none() {
            match self.child.kill() {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
                Err(e) => return Err(SolverError::Kill(e)),
            }
            debug!(program = %self.program.display(), "process killed");
        }
        self.wait().map(|_| ())
    }
}

impl Drop for ScopedProcess {
    fn drop(&mut self) {
        if !self.reaped
            && let Err(e) = self.kill()
        {
            warn!(program = %self.program.display(), error = %e, "failed to stop process");
        }
        // A grandchild may still hold the pipe; never block on it here.
        if let Some(reader) = self.reader.take()
            && reader.is_finished()
        {
            let _ = reader.join();
        }
    }
}

/// Splits raw output on `\n`, `\r` and `\r\n`, sending each line.
#[derive(Default)]
struct LineSplitter {
    pending: Vec<u8>,
    after_cr: bool,
}

impl LineSplitter {
    fn feed(&mut self, bytes: &[u8], mut emit: impl FnMut(String)) {
        for &b in bytes {
            match b {
                b'\n' if self.after_cr => self.after_cr = false,
                b'\n' | b'\r' => {
                    self.after_cr = b == b'\r';
                    emit(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
                _ => {
                    self.after_cr = false;
                    self.pending.push(b);
                }
            }
        }
    }

    fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
    }
}

fn read_lines(mut stdout: ChildStdout, tx: Sender<String>) {
    let mut splitter = LineSplitter::default();
    let mut buf = [0u8; 1000];
    loop {
        let n = match stdout.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "output pipe read failed");
                break;
            }
        };
        let mut closed = false;
        splitter.feed(&buf[..n], |line| closed |= tx.send(line).is_err());
        if closed {
            return;
        }
    }
    if let Some(rest) = splitter.finish() {
        let _ = tx.send(rest);
    }
}
