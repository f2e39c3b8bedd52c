//! Speed-change pipeline orchestration

use super::config::ConvertConfig;
use super::temp::TempArtifact;
use crate::audio::{decode_to_wav, sniff_file, ContainerFormat, DecodedAudio};
use crate::encode::{EncodeSettings, Encoder, FfmpegEncoder};
use crate::error::{dotted_extension, ConvertError};
use crate::model::ConversionRequest;
use crate::stretch::{self, SoundStretch, StretchParams, Stretcher};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// What a finished conversion did
#[derive(Debug, Clone, Copy)]
pub struct ConversionSummary {
    /// Container sniffed from the input header
    pub format: ContainerFormat,
    /// Decoded source stream
    pub source: DecodedAudio,
    pub params: StretchParams,
    pub settings: EncodeSettings,
}

/// Copy → sniff → decode → stretch → encode, with scratch files cleaned up
pub struct SpeedChanger<S: Stretcher, E: Encoder> {
    config: ConvertConfig,
    stretcher: S,
    encoder: E,
}

impl SpeedChanger<SoundStretch, FfmpegEncoder> {
    /// Wire up the external soundstretch and ffmpeg tools from the config
    pub fn with_defaults(config: ConvertConfig) -> Self {
        let stretcher =
            SoundStretch::new(config.soundstretch_path()).with_timeout(config.process_timeout);
        let encoder = FfmpegEncoder::new(config.ffmpeg.clone()).with_timeout(config.process_timeout);
        Self::new(config, stretcher, encoder)
    }
}

impl<S: Stretcher, E: Encoder> SpeedChanger<S, E> {
    pub fn new(config: ConvertConfig, stretcher: S, encoder: E) -> Self {
        Self {
            config,
            stretcher,
            encoder,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Run one conversion
    ///
    /// `request.output_path` is only replaced once encoding has succeeded, so
    /// on error a pre-existing file there (or the input itself, for in-place
    /// conversions) is untouched. Temp files are removed on every path out.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionSummary> {
        request.validate()?;

        log::info!(
            "Converting {:?} at {}x (pitch: {}, DT compensation: {}, high quality: {})",
            request.input_path,
            request.speed_multiplier,
            request.change_pitch,
            request.compensate_for_rate_doubling,
            request.high_quality
        );

        let work_dir = &self.config.work_dir;
        fs::create_dir_all(work_dir)
            .with_context(|| format!("Failed to create work directory {:?}", work_dir))?;

        let raw_copy = TempArtifact::new(work_dir, &dotted_extension(&request.input_path))?;
        let decoded_wav = TempArtifact::new(work_dir, ".wav")?;
        let stretched_wav = TempArtifact::new(work_dir, ".wav")?;

        // Step 1: private copy of the input
        fs::copy(&request.input_path, raw_copy.path()).with_context(|| {
            format!(
                "Failed to copy {:?} to {:?}",
                request.input_path,
                raw_copy.path()
            )
        })?;

        // Step 2: sniff and decode
        let format = sniff_file(raw_copy.path())?;
        let source = self.decode(format, raw_copy.path(), decoded_wav.path(), &request.input_path)?;

        // Step 3: stretch
        let params = stretch::plan(request);
        self.stretcher
            .stretch(decoded_wav.path(), stretched_wav.path(), &params)
            .context("Time-stretch failed")?;

        // Step 4: encode next to the destination, then swap it in
        let settings = EncodeSettings::for_quality(request.quality());
        let dest_dir = output_dir(&request.output_path);
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create output directory {:?}", dest_dir))?;

        let encoded = TempArtifact::new(dest_dir, ".ogg")?;
        self.encoder
            .encode(stretched_wav.path(), encoded.path(), &settings)
            .with_context(|| format!("Failed to encode {:?}", request.output_path))?;
        encoded.persist(&request.output_path)?;

        log::info!("Wrote {:?}", request.output_path);

        Ok(ConversionSummary {
            format,
            source,
            params,
            settings,
        })
    }

    /// Decode along the sniffed path; every failure reports the original extension
    fn decode(
        &self,
        format: ContainerFormat,
        source: &Path,
        wav_path: &Path,
        original: &Path,
    ) -> Result<DecodedAudio> {
        if format == ContainerFormat::Unknown {
            log::debug!("Unrecognized header, falling back to content probing");
        }

        match decode_to_wav(source, format, wav_path) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                log::warn!("Decoding {:?} as {:?} failed: {:#}", original, format, e);
                Err(ConvertError::unsupported(original).into())
            }
        }
    }
}

/// Directory the output lands in; a bare file name means the current directory
fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
