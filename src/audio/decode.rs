//! Decode compressed audio to a 16-bit PCM WAV file
//!
//! Decoding is done by symphonia; the intermediate WAV is written with hound
//! at the source's own sample rate and channel count.

use super::sniff::ContainerFormat;
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Summary of a decoded stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    /// Sample frames written (one frame = one sample per channel)
    pub frames: u64,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Decode `source` along the path chosen for `format` and write a 16-bit WAV to `wav_path`
pub fn decode_to_wav(source: &Path, format: ContainerFormat, wav_path: &Path) -> Result<DecodedAudio> {
    log::debug!("Decoding {:?} via {} path", source, format.probe_hint());

    let file =
        File::open(source).with_context(|| format!("Failed to open audio file: {:?}", source))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format.probe_hint());

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to probe audio format: {:?}", source))?;

    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut writer: Option<WavWriter<BufWriter<File>>> = None;
    let mut wav_spec: Option<WavSpec> = None;
    let mut frames: u64 = 0;

    loop {
        let packet = match reader.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                log::warn!(
                    "Stream reset in {:?} (chained stream?), output truncated at {} frames",
                    source,
                    frames
                );
                break;
            }
            Err(e) => return Err(e).context("Failed to read packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping corrupt packet in {:?}: {}", source, e);
                continue;
            }
            Err(e) => return Err(e).context("Failed to decode packet"),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 || decoded.frames() == 0 {
            continue;
        }

        if writer.is_none() {
            let new_spec = WavSpec {
                channels: channels as u16,
                sample_rate: spec.rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            };
            writer = Some(
                WavWriter::create(wav_path, new_spec)
                    .with_context(|| format!("Failed to create WAV file: {:?}", wav_path))?,
            );
            wav_spec = Some(new_spec);
        } else if let Some(ws) = wav_spec {
            if ws.channels as usize != channels || ws.sample_rate != spec.rate {
                log::warn!(
                    "Stream format changed mid-file ({}ch/{}Hz -> {}ch/{}Hz), skipping packet",
                    ws.channels,
                    ws.sample_rate,
                    channels,
                    spec.rate
                );
                continue;
            }
        }

        let mut sample_buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        if let Some(w) = writer.as_mut() {
            for &sample in sample_buf.samples() {
                w.write_sample(sample)?;
            }
        }
        frames += (sample_buf.samples().len() / channels) as u64;
    }

    let (writer, wav_spec) = match (writer, wav_spec) {
        (Some(w), Some(s)) => (w, s),
        _ => anyhow::bail!("No audio frames decoded from {:?}", source),
    };
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {:?}", wav_path))?;

    let decoded = DecodedAudio {
        sample_rate: wav_spec.sample_rate,
        channels: wav_spec.channels,
        frames,
    };

    log::debug!(
        "Decoded {} frames ({:.1}s) at {}Hz, {} channel(s)",
        decoded.frames,
        decoded.duration_secs(),
        decoded.sample_rate,
        decoded.channels
    );

    Ok(decoded)
}
