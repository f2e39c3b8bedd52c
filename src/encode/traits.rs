//! Encoder trait and output settings

use crate::model::Quality;
use anyhow::Result;
use std::path::Path;

/// Output sample rate for every encoded file
pub const OUTPUT_SAMPLE_RATE: u32 = 44_100;

/// Final-container encoder - allows swapping ffmpeg for a test double
pub trait Encoder {
    /// Encode the WAV at `input` into the final container at `output`
    fn encode(&self, input: &Path, output: &Path, settings: &EncodeSettings) -> Result<()>;
}

/// Target format for the encoded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub sample_rate: u32,
    pub bitrate_kbps: u32,
}

impl EncodeSettings {
    /// Ogg Vorbis at 44.1kHz; 128 kbps normally, 192 kbps for high quality
    pub fn for_quality(quality: Quality) -> Self {
        let bitrate_kbps = match quality {
            Quality::Normal => 128,
            Quality::High => 192,
        };

        Self {
            sample_rate: OUTPUT_SAMPLE_RATE,
            bitrate_kbps,
        }
    }
}
