#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use va_solver::{
    ProcessState, ScopedProcess, SolverControl, SolverError, monitor, run_to_completion,
};

const POLL: Duration = Duration::from_millis(20);

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

fn sh() -> &'static Path {
    Path::new("/bin/sh")
}

fn script(body: &str) -> Vec<String> {
    vec!["-c".to_string(), body.to_string()]
}

#[test]
fn output_lines_and_exit_code() {
    let control = SolverControl::new();
    let mut lines = Vec::new();
    let mut sink = |l: &str| lines.push(l.to_string());
    let state = run_to_completion(
        sh(),
        &script("printf 'Solving\\r 10%%\\r 20%%\\r\\ndone\\n'; exit 3"),
        None,
        &mut sink,
        &control,
        POLL,
    )
    .unwrap();

    assert_eq!(state, ProcessState::Completed { code: Some(3) });
    assert_eq!(lines, ["Solving", " 10%", " 20%", "done"]);
    assert!(!control.is_running());
}

#[test]
fn kill_request_stops_the_process() {
    let control = SolverControl::new();
    let killer = control.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        killer.kill();
    });

    let started = Instant::now();
    let mut lines = Vec::new();
    let mut sink = |l: &str| lines.push(l.to_string());
    let state = run_to_completion(
        sh(),
        &script("echo started; exec sleep 30"),
        None,
        &mut sink,
        &control,
        POLL,
    )
    .unwrap();
    handle.join().unwrap();

    assert_eq!(state, ProcessState::Killed);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(lines, ["started"]);
    assert!(control.is_kill_requested());
    assert!(!control.is_running());
}

#[test]
fn working_directory_is_honoured() {
    let dir = unique_temp_dir("va_solver_cwd");
    let control = SolverControl::new();
    let mut sink = va_solver::NullSink;
    let state = run_to_completion(
        sh(),
        &script("echo marker > out.txt"),
        Some(&dir),
        &mut sink,
        &control,
        POLL,
    )
    .unwrap();
    assert_eq!(state, ProcessState::Completed { code: Some(0) });
    assert_eq!(fs::read_to_string(dir.join("out.txt")).unwrap(), "marker\n");
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_program_is_a_spawn_error() {
    let control = SolverControl::new();
    let mut sink = va_solver::NullSink;
    let err = run_to_completion(
        Path::new("/nonexistent/vspaero"),
        &[],
        None,
        &mut sink,
        &control,
        POLL,
    )
    .unwrap_err();
    assert!(matches!(err, SolverError::Spawn { .. }));
    assert!(!control.is_running());
}

#[test]
fn second_run_on_busy_control_is_refused() {
    let control = SolverControl::new();
    assert!(control.try_begin());
    let mut sink = va_solver::NullSink;
    let err = run_to_completion(sh(), &script("true"), None, &mut sink, &control, POLL).unwrap_err();
    assert!(matches!(err, SolverError::Busy));
    control.finish();
}

#[test]
fn dropping_a_running_process_reaps_it() {
    let process = ScopedProcess::spawn(sh(), &script("exec sleep 30")).unwrap();
    let pid = process.id();
    let started = Instant::now();
    drop(process);
    assert!(started.elapsed() < Duration::from_secs(5));
    // Reaped: the pid no longer has a /proc entry on Linux.
    if Path::new("/proc").exists() {
        assert!(!Path::new(&format!("/proc/{pid}")).exists());
    }
}

#[test]
fn monitor_delivers_output_written_before_exit() {
    let control = SolverControl::new();
    let mut process = ScopedProcess::spawn(sh(), &script("for i in 1 2 3 4 5; do echo line$i; done")).unwrap();
    let mut count = 0;
    let mut sink = |_: &str| count += 1;
    let state = monitor(&mut process, &mut sink, &control, POLL).unwrap();
    assert_eq!(state, ProcessState::Completed { code: Some(0) });
    assert_eq!(count, 5);
}
