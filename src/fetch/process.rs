//! Child processes with deadlines.
//!
//! Backends that shell out (git) must honor the caller-supplied fetch
//! timeout. [`run_with_deadline`] spawns the child, drains its output on
//! reader threads, and kills it when the deadline passes.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::fetch::FetchError;

/// Collected output of a finished child process.
#[derive(Debug)]
pub struct CommandOutput {
    /// Whether the child exited with status 0.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run a command, killing it if it outlives `timeout`.
pub fn run_with_deadline(cmd: &mut Command, timeout: Duration) -> Result<CommandOutput, FetchError> {
    let start = Instant::now();

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn()?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_handle = thread::spawn(move || read_all(stdout));
    let stderr_handle = thread::spawn(move || read_all(stderr));

    loop {
        match child.try_wait()? {
            Some(status) => {
                let stdout = stdout_handle.join().unwrap_or_default();
                let stderr = stderr_handle.join().unwrap_or_default();
                return Ok(CommandOutput {
                    success: status.success(),
                    stdout,
                    stderr,
                });
            }
            None => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(FetchError::Timeout);
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

fn read_all(pipe: Option<impl Read>) -> String {
    let Some(pipe) = pipe else {
        return String::new();
    };
    let reader = BufReader::new(pipe);
    let mut output = String::new();
    for line in reader.lines().map_while(Result::ok) {
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Remaining-time bookkeeping for multi-command fetches.
///
/// Each command gets whatever is left of the overall budget; an exhausted
/// deadline is itself a timeout.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// Time left, or `FetchError::Timeout` if none.
    pub fn remaining(&self) -> Result<Duration, FetchError> {
        let elapsed = self.start.elapsed();
        if elapsed >= self.budget {
            Err(FetchError::Timeout)
        } else {
            Ok(self.budget - elapsed)
        }
    }
}
