//! Ogg Vorbis encoding through the ffmpeg command-line tool

use super::traits::{EncodeSettings, Encoder};
use crate::convert::temp::has_content;
use crate::error::ConvertError;
use crate::process::ToolCommand;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL_NAME: &str = "ffmpeg";

/// Encodes WAV to Ogg Vorbis with an external ffmpeg
pub struct FfmpegEncoder {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl FfmpegEncoder {
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self, input: &Path, output: &Path, settings: &EncodeSettings) -> ToolCommand {
        ToolCommand::new(TOOL_NAME, &self.executable)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vn", "-c:a", "libvorbis", "-ar"])
            .arg(settings.sample_rate.to_string())
            .arg("-b:a")
            .arg(format!("{}k", settings.bitrate_kbps))
            // the final name may not end in .ogg
            .args(["-f", "ogg"])
            .arg(output)
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, input: &Path, output: &Path, settings: &EncodeSettings) -> Result<()> {
        log::debug!(
            "Encoding {:?} -> {:?} (vorbis, {}Hz, {}kbps)",
            input,
            output,
            settings.sample_rate,
            settings.bitrate_kbps
        );

        self.command(input, output, settings).run(self.timeout)?;

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
