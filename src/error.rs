//! Typed errors for conditions callers may want to match on
//!
//! Everything else propagates as `anyhow::Error` with context attached.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Sniffing and every decode path failed
    #[error("audio file not supported: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("speed multiplier must be a finite number large enough to stretch to, got {0}")]
    InvalidMultiplier(f64),

    #[error("failed to launch {tool} at {path:?}: {source}")]
    ToolLaunch {
        tool: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{tool} did not finish within {timeout:?} and was killed")]
    ToolTimedOut { tool: String, timeout: Duration },

    #[error("{tool} reported success but produced no file at {path:?}")]
    MissingOutput { tool: String, path: PathBuf },
}

impl ConvertError {
    /// Build an `UnsupportedFormat` error from the original input path
    pub fn unsupported(path: &std::path::Path) -> Self {
        Self::UnsupportedFormat {
            extension: dotted_extension(path),
        }
    }
}

/// File extension with its leading dot, or an empty string
pub fn dotted_extension(path: &std::path::Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
