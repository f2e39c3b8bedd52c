use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use song_speed_changer::audio::{sniff_file, ContainerFormat};
use song_speed_changer::encode::{EncodeSettings, Encoder};
use song_speed_changer::stretch::{StretchParams, Stretcher};
use song_speed_changer::{ConversionRequest, ConvertConfig, ConvertError, SpeedChanger};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Stands in for soundstretch: records its parameters and copies the WAV
#[derive(Clone, Default)]
struct FakeStretcher {
    calls: Rc<RefCell<Vec<StretchParams>>>,
    fail: bool,
}

impl Stretcher for FakeStretcher {
    fn stretch(&self, input: &Path, output: &Path, params: &StretchParams) -> Result<()> {
        self.calls.borrow_mut().push(*params);
        if self.fail {
            anyhow::bail!("soundstretch crashed");
        }
        fs::copy(input, output)?;
        Ok(())
    }
}

/// Stands in for ffmpeg: copies the WAV, or fails with or without a partial file
#[derive(Clone, Default)]
struct FakeEncoder {
    calls: Rc<RefCell<Vec<EncodeSettings>>>,
    fail_after_partial_write: bool,
    fail_to_launch: bool,
}

impl Encoder for FakeEncoder {
    fn encode(&self, input: &Path, output: &Path, settings: &EncodeSettings) -> Result<()> {
        self.calls.borrow_mut().push(*settings);
        if self.fail_to_launch {
            anyhow::bail!("ffmpeg not found");
        }
        if self.fail_after_partial_write {
            fs::write(output, b"half an ogg")?;
            anyhow::bail!("ffmpeg ran out of disk");
        }
        fs::copy(input, output)?;
        Ok(())
    }
}

struct Fixture {
    input_dir: TempDir,
    output_dir: TempDir,
    work_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            input_dir: TempDir::new().expect("Failed to create temp dir"),
            output_dir: TempDir::new().expect("Failed to create temp dir"),
            work_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn config(&self) -> ConvertConfig {
        ConvertConfig::new().with_work_dir(self.work_dir.path().to_path_buf())
    }

    fn output(&self) -> PathBuf {
        self.output_dir.path().join("audio 1.2x.ogg")
    }

    fn work_dir_is_empty(&self) -> bool {
        fs::read_dir(self.work_dir.path()).unwrap().count() == 0
    }

    fn output_dir_entries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.output_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    /// One second of 16-bit stereo tone at 44.1kHz under the given file name
    fn wav_input(&self, name: &str) -> PathBuf {
        let path = self.input_dir.path().join(name);
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..44100u32 {
            let t = i as f32 / 44100.0;
            let sample = ((t * 220.0 * 2.0 * std::f32::consts::PI).sin() * 12000.0) as i16;
            writer.write_sample(sample).unwrap();
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    fn raw_input(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.input_dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }
}

fn unsupported_extension(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<ConvertError>() {
        Some(ConvertError::UnsupportedFormat { extension }) => Some(extension.clone()),
        _ => None,
    }
}

#[test]
fn test_successful_conversion_leaves_no_temp_files() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.mp3");
    let stretcher = FakeStretcher::default();
    let encoder = FakeEncoder::default();
    let changer = SpeedChanger::new(fx.config(), stretcher.clone(), encoder.clone());

    let request = ConversionRequest::new(input.clone(), fx.output(), 1.2);
    let summary = changer.convert(&request).expect("conversion should succeed");

    assert!(fx.output().exists());
    assert!(fx.work_dir_is_empty(), "temp files left behind");
    assert!(input.exists(), "input must not be consumed");

    assert_eq!(summary.format, ContainerFormat::Unknown);
    assert_eq!(summary.source.sample_rate, 44100);
    assert_eq!(summary.source.channels, 2);
    assert_eq!(summary.source.frames, 44100);

    let calls = stretcher.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!((calls[0].tempo_percent - 20.0).abs() < 1e-9);
    assert!(calls[0].pitch_semitones.is_none());

    assert_eq!(encoder.calls.borrow()[0].bitrate_kbps, 128);

    // The stretch input was the decoded 16-bit WAV
    let reader = hound::WavReader::open(fx.output()).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.duration(), 44100);
}

#[test]
fn test_flags_reach_the_tools() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.ogg");
    let stretcher = FakeStretcher::default();
    let encoder = FakeEncoder::default();
    let changer = SpeedChanger::new(fx.config(), stretcher.clone(), encoder.clone());

    let request = ConversionRequest::new(input, fx.output(), 1.5)
        .with_pitch_change(true)
        .with_rate_compensation(true)
        .with_high_quality(true);
    changer.convert(&request).unwrap();

    let params = stretcher.calls.borrow()[0];
    assert!(params.tempo_percent.abs() < 1e-9);
    assert!((params.pitch_semitones.unwrap() - 7.0196).abs() < 1e-4);
    assert_eq!(params.to_args(), vec!["-tempo=0", "-pitch=7.0196"]);

    let settings = encoder.calls.borrow()[0];
    assert_eq!(settings.bitrate_kbps, 192);
    assert_eq!(settings.sample_rate, 44100);
}

#[test]
fn test_unrecognized_file_is_unsupported() {
    let fx = Fixture::new();
    let input = fx.raw_input("chart.xyz", &[0x13u8; 8192]);
    let stretcher = FakeStretcher::default();
    let changer = SpeedChanger::new(fx.config(), stretcher.clone(), FakeEncoder::default());

    let request = ConversionRequest::new(input, fx.output(), 1.2);
    let err = changer.convert(&request).unwrap_err();

    assert_eq!(err.to_string(), "audio file not supported: .xyz");
    assert_eq!(unsupported_extension(&err).as_deref(), Some(".xyz"));
    assert!(!fx.output().exists());
    assert!(fx.work_dir_is_empty());
    assert!(stretcher.calls.borrow().is_empty());
}

#[test]
fn test_ogg_header_wins_over_extension() {
    let fx = Fixture::new();
    let input = fx.raw_input("disguised.mp3", b"OggS\x00\x02 not really a page");

    assert_eq!(sniff_file(&input).unwrap(), ContainerFormat::Ogg);

    // Routed to the Ogg path, which rejects the body; the error still names the original extension
    let changer = SpeedChanger::new(fx.config(), FakeStretcher::default(), FakeEncoder::default());
    let err = changer
        .convert(&ConversionRequest::new(input, fx.output(), 1.2))
        .unwrap_err();
    assert_eq!(unsupported_extension(&err).as_deref(), Some(".mp3"));
    assert!(!fx.output().exists());
}

#[test]
fn test_empty_file_is_unsupported() {
    let fx = Fixture::new();
    let input = fx.raw_input("empty.ogg", b"");
    let changer = SpeedChanger::new(fx.config(), FakeStretcher::default(), FakeEncoder::default());

    let err = changer
        .convert(&ConversionRequest::new(input, fx.output(), 0.8))
        .unwrap_err();
    assert_eq!(err.to_string(), "audio file not supported: .ogg");
    assert!(fx.work_dir_is_empty());
}

#[test]
fn test_stretch_failure_produces_nothing() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.mp3");
    let stretcher = FakeStretcher {
        fail: true,
        ..Default::default()
    };
    let encoder = FakeEncoder::default();
    let changer = SpeedChanger::new(fx.config(), stretcher, encoder.clone());

    let result = changer.convert(&ConversionRequest::new(input, fx.output(), 1.3));
    assert!(result.is_err());
    assert!(!fx.output().exists());
    assert!(fx.work_dir_is_empty());
    assert!(encoder.calls.borrow().is_empty());
}

#[test]
fn test_encode_failure_removes_partial_output() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.mp3");
    let encoder = FakeEncoder {
        fail_after_partial_write: true,
        ..Default::default()
    };
    let changer = SpeedChanger::new(fx.config(), FakeStretcher::default(), encoder);

    let result = changer.convert(&ConversionRequest::new(input, fx.output(), 1.3));
    assert!(result.is_err());
    assert!(!fx.output().exists());
    assert!(fx.output_dir_entries().is_empty(), "partial encode left behind");
    assert!(fx.work_dir_is_empty());
}

#[test]
fn test_failed_encode_keeps_existing_output() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.mp3");
    fs::write(fx.output(), b"last week's conversion").unwrap();

    for encoder in [
        FakeEncoder {
            fail_to_launch: true,
            ..Default::default()
        },
        FakeEncoder {
            fail_after_partial_write: true,
            ..Default::default()
        },
    ] {
        let changer = SpeedChanger::new(fx.config(), FakeStretcher::default(), encoder);
        let result = changer.convert(&ConversionRequest::new(input.clone(), fx.output(), 1.3));

        assert!(result.is_err());
        assert_eq!(fs::read(fx.output()).unwrap(), b"last week's conversion");
        assert_eq!(fx.output_dir_entries(), vec![fx.output()]);
        assert!(fx.work_dir_is_empty());
    }
}

#[test]
fn test_in_place_conversion_keeps_input_on_encode_failure() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.ogg");
    let original = fs::read(&input).unwrap();
    let encoder = FakeEncoder {
        fail_to_launch: true,
        ..Default::default()
    };
    let changer = SpeedChanger::new(fx.config(), FakeStretcher::default(), encoder);

    let result = changer.convert(&ConversionRequest::new(input.clone(), input.clone(), 1.3));

    assert!(result.is_err());
    assert_eq!(fs::read(&input).unwrap(), original);
    assert_eq!(fs::read_dir(fx.input_dir.path()).unwrap().count(), 1);
    assert!(fx.work_dir_is_empty());
}

#[test]
fn test_in_place_conversion_replaces_input() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.ogg");
    let changer = SpeedChanger::new(fx.config(), FakeStretcher::default(), FakeEncoder::default());

    changer
        .convert(&ConversionRequest::new(input.clone(), input.clone(), 1.3))
        .unwrap();

    assert!(input.exists());
    assert_eq!(fs::read_dir(fx.input_dir.path()).unwrap().count(), 1);
    assert!(fx.work_dir_is_empty());
}

#[test]
fn test_id3v23_header_takes_mp3_path() {
    let fx = Fixture::new();
    let mut bytes = vec![0x49u8, 0x44, 0x33, 0x03];
    bytes.extend_from_slice(&[0u8; 4096]);
    let input = fx.raw_input("track.mp3", &bytes);

    assert_eq!(sniff_file(&input).unwrap(), ContainerFormat::Id3Mp3);

    let stretcher = FakeStretcher::default();
    let changer = SpeedChanger::new(fx.config(), stretcher.clone(), FakeEncoder::default());
    let err = changer
        .convert(&ConversionRequest::new(input, fx.output(), 1.2))
        .unwrap_err();

    assert_eq!(err.to_string(), "audio file not supported: .mp3");
    assert!(!fx.output().exists());
    assert!(fx.work_dir_is_empty());
    assert!(stretcher.calls.borrow().is_empty());
}

#[test]
fn test_missing_soundstretch_is_reported() {
    let fx = Fixture::new();
    let input = fx.wav_input("song.mp3");
    let config = fx
        .config()
        .with_binaries_dir(fx.input_dir.path().join("no-binaries-here"));
    let changer = SpeedChanger::with_defaults(config);

    let err = changer
        .convert(&ConversionRequest::new(input, fx.output(), 1.1))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::ToolLaunch { .. })
    ));
    assert!(!fx.output().exists());
    assert!(fx.work_dir_is_empty());
}
