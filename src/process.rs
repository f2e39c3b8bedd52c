//! Blocking child-process runner for the external tools
//!
//! Spawns without a shell, waits for exit (optionally bounded by a timeout)
//! and turns launch failures, non-zero exits and timeouts into
//! [`ConvertError`]s.

use crate::error::ConvertError;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a bounded wait polls the child
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Keep this many trailing bytes of stderr for error messages
const STDERR_TAIL_BYTES: usize = 2048;

/// A fully-specified external tool invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Human-readable tool name used in logs and errors
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(tool: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments joined for logging
    pub fn display_args(&self) -> String {
        self.args
            .iter()
            .map(|a| {
                let s = a.to_string_lossy();
                if s.contains(' ') {
                    format!("\"{}\"", s)
                } else {
                    s.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion; `timeout` of `None` waits indefinitely
    pub fn run(&self, timeout: Option<Duration>) -> Result<(), ConvertError> {
        log::info!("{} {}", self.tool, self.display_args());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ConvertError::ToolLaunch {
                tool: self.tool.clone(),
                path: self.program.clone(),
                source,
            })?;

        let stderr = child.stderr.take();
        let drain = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = stderr {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });

        let status = self.wait_for(&mut child, timeout);
        let stderr = drain.join().unwrap_or_default();
        let status = status?;

        if !status.success() {
            return Err(ConvertError::ToolFailed {
                tool: self.tool.clone(),
                status,
                stderr: stderr_tail(&stderr),
            });
        }

        if !stderr.is_empty() {
            log::debug!("{} stderr: {}", self.tool, stderr_tail(&stderr));
        }
        Ok(())
    }

    fn wait_for(&self, child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, ConvertError> {
        let wait_error = |source| ConvertError::ToolLaunch {
            tool: self.tool.clone(),
            path: self.program.clone(),
            source,
        };

        let Some(limit) = timeout else {
            return child.wait().map_err(wait_error);
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait().map_err(wait_error)? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                log::warn!("{} exceeded {:?}, killing it", self.tool, limit);
                let _ = child.kill();
                let _ = child.wait();
                return Err(ConvertError::ToolTimedOut {
                    tool: self.tool.clone(),
                    timeout: limit,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn stderr_tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

/// Locate an executable inside a directory, adding the platform suffix
pub fn executable_in(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
}
