//! Output encoding layer

mod ffmpeg;
mod traits;

pub use ffmpeg::FfmpegEncoder;
pub use traits::{EncodeSettings, Encoder, OUTPUT_SAMPLE_RATE};
