//! SoundTouch's `soundstretch` command-line tool as a [`Stretcher`]

use super::traits::{StretchParams, Stretcher};
use crate::convert::temp::has_content;
use crate::error::ConvertError;
use crate::process::ToolCommand;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL_NAME: &str = "soundstretch";

/// Runs the external soundstretch executable
pub struct SoundStretch {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl SoundStretch {
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            timeout: None,
        }
    }

    /// Kill the tool if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full invocation: `<in> <out> [-quick] [-naa] -tempo=<pct> [-pitch=<st>]`
    pub fn command(&self, input: &Path, output: &Path, params: &StretchParams) -> ToolCommand {
        ToolCommand::new(TOOL_NAME, &self.executable)
            .arg(input)
            .arg(output)
            .args(params.to_args())
    }
}

impl Stretcher for SoundStretch {
    fn stretch(&self, input: &Path, output: &Path, params: &StretchParams) -> Result<()> {
        log::debug!(
            "Stretching {:?} -> {:?} (tempo {:+.2}%, pitch {:?})",
            input,
            output,
            params.tempo_percent,
            params.pitch_semitones
        );

        self.command(input, output, params).run(self.timeout)?;

        if !has_content(output) {
            return Err(ConvertError::MissingOutput {
                tool: TOOL_NAME.to_string(),
                path: output.to_path_buf(),
            }
            .into());
        }

        Ok(())
    }
}
