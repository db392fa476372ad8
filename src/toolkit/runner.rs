use crate::toolkit::{ToolKind, ToolkitError};
use std::ffi::OsString;
use std::io::{BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// A fully resolved external command. Arguments are passed to the process
/// as a vector and never through a shell.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool: ToolKind,
    pub binary: String,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn command_form(&self) -> String {
        let mut form = self.binary.clone();
        for arg in &self.args {
            form.push(' ');
            form.push_str(&arg.to_string_lossy());
        }
        form
    }
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_tool(
    invocation: &ToolInvocation,
    timeout: Option<Duration>,
) -> Result<ToolOutput, ToolkitError> {
    let command_form = invocation.command_form();
    tracing::debug!(tool = %invocation.tool, command = %command_form, "running converter");

    let mut command = Command::new(&invocation.binary);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolkitError::MissingBinary {
                tool: invocation.tool,
                binary: invocation.binary.clone(),
            })
        }
        Err(source) => {
            return Err(ToolkitError::Spawn {
                tool: invocation.tool,
                binary: invocation.binary.clone(),
                source,
            })
        }
    };

    let stdout_reader = child.stdout.take().map(|stdout| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = BufReader::new(stdout).read_to_string(&mut buf);
            buf
        })
    });
    let stderr_reader = child.stderr.take().map(|stderr| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut buf);
            buf
        })
    });
    let collect = |reader: Option<thread::JoinHandle<String>>| {
        reader
            .map(|handle| handle.join().unwrap_or_default())
            .unwrap_or_default()
    };

    let spawn_error = |source| ToolkitError::Spawn {
        tool: invocation.tool,
        binary: invocation.binary.clone(),
        source,
    };

    let exit_status = match timeout {
        None => child.wait().map_err(spawn_error)?,
        Some(limit) => {
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) => {
                        if start.elapsed() > limit {
                            // Reader threads are left to finish on their own;
                            // grandchildren may still hold the pipes open.
                            let _ = child.kill();
                            let _ = child.wait();
                            tracing::warn!(tool = %invocation.tool, "converter timed out");
                            return Err(ToolkitError::Timeout {
                                tool: invocation.tool,
                                timeout_ms: limit.as_millis() as u64,
                            });
                        }
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(err) => return Err(spawn_error(err)),
                }
            }
        }
    };

    let stdout = collect(stdout_reader);
    let stderr = collect(stderr_reader);

    if !exit_status.success() {
        tracing::warn!(
            tool = %invocation.tool,
            exit_code = exit_status.code().unwrap_or(-1),
            "converter failed"
        );
        return Err(ToolkitError::NonZeroExit {
            tool: invocation.tool,
            exit_code: exit_status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
            command_form,
        });
    }

    Ok(ToolOutput {
        exit_code: exit_status.code(),
        stdout,
        stderr,
    })
}
