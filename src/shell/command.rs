//! External process execution.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, SproutError};

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of running an external program.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (None if killed by signal or deadline).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the program exited with code 0.
    pub success: bool,

    /// Whether the program was killed for exceeding its deadline.
    pub timed_out: bool,
}

/// Run `program` with `args`, capturing output.
///
/// With a `timeout`, the child is killed once the deadline passes and the
/// result is marked `timed_out`. Failing to spawn the program at all is an
/// error; a non-zero exit is reported through the result.
pub fn run(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Option<Duration>,
) -> Result<CommandOutput> {
    let start = Instant::now();
    let command_line = format!("{} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    tracing::debug!("Running: {}", command_line);
    let mut child = cmd.spawn().map_err(|_| SproutError::CommandFailed {
        command: command_line.clone(),
        code: None,
    })?;

    // Drain pipes on their own threads so a chatty child cannot block on a
    // full pipe while we poll it.
    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let (status, timed_out) = wait_with_deadline(&mut child, timeout)?;

    // Grandchildren of a killed process may still hold the pipes open, so
    // readers are only joined after a normal exit.
    let (stdout, stderr) = if timed_out {
        (String::new(), String::new())
    } else {
        (join_reader(stdout_handle), join_reader(stderr_handle))
    };

    let exit_code = if timed_out { None } else { status.code() };

    Ok(CommandOutput {
        exit_code,
        stdout,
        stderr,
        duration: start.elapsed(),
        success: !timed_out && status.success(),
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Option<Duration>,
) -> Result<(std::process::ExitStatus, bool)> {
    let Some(timeout) = timeout else {
        return Ok((child.wait()?, false));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }

        if Instant::now() >= deadline {
            tracing::debug!("Killing child process after {:?}", timeout);
            let _ = child.kill();
            return Ok((child.wait()?, true));
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn run_successful_command() {
        let out = run("sh", &["-c", "echo hello"], None, None).unwrap();
        assert!(out.success);
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.stdout.trim(), "hello");
        assert!(!out.timed_out);
    }

    #[test]
    fn run_failing_command() {
        let out = run("sh", &["-c", "echo oops >&2; exit 3"], None, None).unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn run_with_cwd() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();

        let out = run("ls", &[], Some(temp.path()), None).unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[test]
    fn run_kills_on_deadline() {
        let out = run(
            "sh",
            &["-c", "sleep 5"],
            None,
            Some(Duration::from_millis(200)),
        )
        .unwrap();
        assert!(out.timed_out);
        assert!(!out.success);
        assert_eq!(out.exit_code, None);
        assert!(out.duration < Duration::from_secs(5));
    }

    #[test]
    fn run_finishes_before_deadline() {
        let out = run("sh", &["-c", "true"], None, Some(Duration::from_secs(10))).unwrap();
        assert!(out.success);
        assert!(!out.timed_out);
    }

    #[test]
    fn missing_program_is_error() {
        let err = run("definitely-not-a-real-program-xyz", &[], None, None).unwrap_err();
        assert!(matches!(err, SproutError::CommandFailed { .. }));
    }
}
