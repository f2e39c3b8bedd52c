use crate::error::ConvertError;
use std::path::PathBuf;

/// Rate multiplier a game mode already applies on top of the audio (DT/NC)
pub const RATE_DOUBLING_FACTOR: f64 = 1.5;

/// Smallest tempo basis whose `-tempo` value still renders above -100 at 4 decimals
pub const MIN_TEMPO_BASIS: f64 = 1e-6;

/// A single speed-change job
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    /// Source audio file (format is sniffed from content, not extension)
    pub input_path: PathBuf,

    /// Destination for the encoded Ogg Vorbis file
    pub output_path: PathBuf,

    /// Effective playback-speed multiplier requested by the caller
    pub speed_multiplier: f64,

    /// Shift pitch along with tempo (nightcore style)
    pub change_pitch: bool,

    /// Divide the tempo basis by 1.5 because the game will apply that rate itself
    pub compensate_for_rate_doubling: bool,

    /// Use the slower stretch settings and the higher bitrate tier
    pub high_quality: bool,
}

/// Stretch and encode quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Fast stretch (`-quick -naa`), 128 kbps
    Normal,

    /// Full-quality stretch, 192 kbps
    High,
}

impl ConversionRequest {
    pub fn new(input_path: PathBuf, output_path: PathBuf, speed_multiplier: f64) -> Self {
        Self {
            input_path,
            output_path,
            speed_multiplier,
            change_pitch: false,
            compensate_for_rate_doubling: false,
            high_quality: false,
        }
    }

    pub fn with_pitch_change(mut self, enable: bool) -> Self {
        self.change_pitch = enable;
        self
    }

    pub fn with_rate_compensation(mut self, enable: bool) -> Self {
        self.compensate_for_rate_doubling = enable;
        self
    }

    pub fn with_high_quality(mut self, enable: bool) -> Self {
        self.high_quality = enable;
        self
    }

    pub fn quality(&self) -> Quality {
        if self.high_quality {
            Quality::High
        } else {
            Quality::Normal
        }
    }

    /// Multiplier the stretch tool should apply
    ///
    /// With rate compensation the game's own 1.5x is factored out.
    pub fn tempo_basis(&self) -> f64 {
        if self.compensate_for_rate_doubling {
            self.speed_multiplier / RATE_DOUBLING_FACTOR
        } else {
            self.speed_multiplier
        }
    }

    /// Reject multipliers the stretch arithmetic cannot handle
    pub fn validate(&self) -> Result<(), ConvertError> {
        let m = self.speed_multiplier;
        if !m.is_finite() || m <= 0.0 || self.tempo_basis() < MIN_TEMPO_BASIS {
            return Err(ConvertError::InvalidMultiplier(m));
        }
        Ok(())
    }
}
