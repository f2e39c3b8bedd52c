use anyhow::Result;
use clap::Parser;
use song_speed_changer::validation::{duration_matches, expected_duration, probe_output};
use song_speed_changer::{ConversionRequest, ConvertConfig, SpeedChanger};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "song-speed-changer")]
#[command(about = "Re-time a song for rhythm-game speed practice", long_about = None)]
struct Args {
    /// Source audio file (Ogg or MP3; format is detected from content)
    input: String,

    /// Destination Ogg Vorbis file
    output: String,

    /// Speed multiplier, e.g. 1.2 for 120% speed
    #[arg(short = 'r', long)]
    rate: f64,

    /// Shift pitch with tempo (nightcore) instead of preserving it
    #[arg(long)]
    change_pitch: bool,

    /// The game already applies a 1.5x rate (DT/NC); stretch only the remainder
    #[arg(long)]
    pre_dt: bool,

    /// Slower, higher quality stretch and 192 kbps output (default: 128 kbps)
    #[arg(long)]
    high_quality: bool,

    /// Directory containing the soundstretch binary
    #[arg(long, default_value = "binaries")]
    binaries_dir: String,

    /// Explicit path to soundstretch (overrides --binaries-dir)
    #[arg(long)]
    soundstretch: Option<String>,

    /// ffmpeg executable
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: String,

    /// Directory for intermediate files (default: system temp dir)
    #[arg(long)]
    work_dir: Option<String>,

    /// Kill soundstretch/ffmpeg after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Skip reading the output back after conversion
    #[arg(long)]
    no_verify: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = ConvertConfig::new()
        .with_binaries_dir(expand(&args.binaries_dir))
        .with_ffmpeg(expand(&args.ffmpeg))
        .with_timeout(args.timeout.map(Duration::from_secs));

    if let Some(ref path) = args.soundstretch {
        config = config.with_soundstretch(expand(path));
    }
    if let Some(ref dir) = args.work_dir {
        config = config.with_work_dir(expand(dir));
    }

    let request = ConversionRequest::new(expand(&args.input), expand(&args.output), args.rate)
        .with_pitch_change(args.change_pitch)
        .with_rate_compensation(args.pre_dt)
        .with_high_quality(args.high_quality);

    let changer = SpeedChanger::with_defaults(config);
    log::debug!("soundstretch: {:?}", changer.config().soundstretch_path());
    log::debug!("ffmpeg: {:?}", changer.config().ffmpeg);

    let summary = changer.convert(&request)?;

    log::info!(
        "Done: {:?} ({:?}, {:.1}s source) -> {:?} at {}kbps",
        request.input_path,
        summary.format,
        summary.source.duration_secs(),
        request.output_path,
        summary.settings.bitrate_kbps
    );

    if args.no_verify {
        return Ok(());
    }

    // Auto-validate the produced file
    let info = probe_output(&request.output_path)?;
    let expected = expected_duration(summary.source.duration_secs(), request.tempo_basis());
    log::info!(
        "Output: {} {}Hz {}ch, {:.1}s (expected {:.1}s)",
        info.codec,
        info.sample_rate,
        info.channels,
        info.duration_secs,
        expected
    );
    if !duration_matches(expected, info.duration_secs) {
        log::warn!(
            "Output duration {:.1}s differs from the expected {:.1}s",
            info.duration_secs,
            expected
        );
    }

    Ok(())
}
