//! Temporary files owned by a single conversion

use anyhow::{Context, Result};
use std::path::Path;
use tempfile::{Builder, TempPath};

/// A uniquely named scratch file, deleted when dropped
///
/// The file is created empty; writers truncate it. Deletion errors on drop
/// are ignored.
#[derive(Debug)]
pub struct TempArtifact {
    path: TempPath,
}

impl TempArtifact {
    /// Create `<dir>/<random><extension>`; `extension` includes its dot or is empty
    pub fn new(dir: &Path, extension: &str) -> Result<Self> {
        let path = Builder::new()
            .prefix("speed-")
            .suffix(extension)
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?
            .into_temp_path();

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the file to `target`, replacing whatever is there, and stop tracking it
    ///
    /// `target` should be on the same filesystem so the rename is atomic.
    pub fn persist(self, target: &Path) -> Result<()> {
        self.path
            .persist(target)
            .with_context(|| format!("Failed to move finished file to {:?}", target))?;
        Ok(())
    }
}

/// Non-empty file at `path`
pub fn has_content(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}
