//! Read back an encoded file with symphonia

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Relative duration error tolerated before warning
pub const DURATION_TOLERANCE: f64 = 0.02;

/// What the produced file looks like
#[derive(Debug, Clone, PartialEq)]
pub struct OutputInfo {
    /// Codec short name, e.g. "vorbis"
    pub codec: String,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f64,
}

/// Probe `path` and report its first audio track
pub fn probe_output(path: &Path) -> Result<OutputInfo> {
    log::debug!("Probing output: {:?}", path);

    let file = File::open(path).with_context(|| format!("Failed to open output: {:?}", path))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Output is not a readable audio file: {:?}", path))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("Output has no audio track")?;

    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params.sample_rate.context("Output has no sample rate")?;
    let channels = params.channels.map(|c| c.count()).unwrap_or(0);
    let codec = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|d| d.short_name.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let frames = match params.n_frames {
        Some(n) => n,
        None => {
            // No frame count in the header; add up packet durations instead
            let mut total = 0u64;
            loop {
                match reader.next_packet() {
                    Ok(packet) if packet.track_id() == track_id => total += packet.dur,
                    Ok(_) => {}
                    Err(SymphoniaError::IoError(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        break
                    }
                    Err(e) => return Err(e).context("Failed to read output packets"),
                }
            }
            total
        }
    };

    Ok(OutputInfo {
        codec,
        sample_rate,
        channels,
        duration_secs: frames as f64 / sample_rate as f64,
    })
}

/// Duration a stretch by `tempo_basis` should produce
pub fn expected_duration(source_secs: f64, tempo_basis: f64) -> f64 {
    source_secs / tempo_basis
}

/// Whether `actual` is within [`DURATION_TOLERANCE`] of `expected`
pub fn duration_matches(expected: f64, actual: f64) -> bool {
    if expected <= 0.0 {
        return actual <= 0.0;
    }
    ((actual - expected) / expected).abs() <= DURATION_TOLERANCE
}
