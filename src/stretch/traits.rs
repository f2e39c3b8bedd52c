//! Stretcher trait and its parameters

use super::tempo::format_number;
use crate::model::Quality;
use anyhow::Result;
use std::path::Path;

/// Time-stretch backend - allows swapping the external tool for a test double
pub trait Stretcher {
    /// Read `input` (16-bit WAV), write the stretched WAV to `output`
    fn stretch(&self, input: &Path, output: &Path, params: &StretchParams) -> Result<()>;
}

/// What the stretch tool should do to the decoded audio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchParams {
    /// Tempo change in percent (`50.0` plays 1.5x as fast)
    pub tempo_percent: f64,

    /// Pitch shift in semitones, `None` keeps the original pitch
    pub pitch_semitones: Option<f64>,

    pub quality: Quality,
}

impl StretchParams {
    /// Option flags in soundstretch syntax, excluding the file arguments
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.quality == Quality::Normal {
            args.push("-quick".to_string());
            args.push("-naa".to_string());
        }

        args.push(format!("-tempo={}", format_number(self.tempo_percent)));

        if let Some(semitones) = self.pitch_semitones {
            args.push(format!("-pitch={}", format_number(semitones)));
        }

        args
    }
}
