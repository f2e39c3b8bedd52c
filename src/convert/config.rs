//! Converter configuration

use crate::process::executable_in;
use std::path::PathBuf;
use std::time::Duration;

/// Where the external tools live and where intermediates go
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Directory holding bundled tool binaries (soundstretch)
    pub binaries_dir: PathBuf,

    /// Explicit soundstretch path; overrides `binaries_dir` lookup
    pub soundstretch: Option<PathBuf>,

    /// ffmpeg executable (bare name resolves through PATH)
    pub ffmpeg: PathBuf,

    /// Directory for the three temporary files of each conversion
    pub work_dir: PathBuf,

    /// Kill an external tool that runs longer than this (None = wait forever)
    pub process_timeout: Option<Duration>,
}

impl ConvertConfig {
    pub fn new() -> Self {
        Self {
            binaries_dir: PathBuf::from("binaries"),
            soundstretch: None,
            ffmpeg: PathBuf::from("ffmpeg"),
            work_dir: std::env::temp_dir(),
            process_timeout: None,
        }
    }

    pub fn with_binaries_dir(mut self, dir: PathBuf) -> Self {
        self.binaries_dir = dir;
        self
    }

    pub fn with_soundstretch(mut self, path: PathBuf) -> Self {
        self.soundstretch = Some(path);
        self
    }

    pub fn with_ffmpeg(mut self, path: PathBuf) -> Self {
        self.ffmpeg = path;
        self
    }

    pub fn with_work_dir(mut self, dir: PathBuf) -> Self {
        self.work_dir = dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.process_timeout = timeout;
        self
    }

    /// Resolved soundstretch executable
    pub fn soundstretch_path(&self) -> PathBuf {
        self.soundstretch
            .clone()
            .unwrap_or_else(|| executable_in(&self.binaries_dir, "soundstretch"))
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self::new()
    }
}
