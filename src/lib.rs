//! Song Speed Changer - tempo/pitch conversion for rhythm-game practice
//!
//! Rewrites an audio file at a new playback speed: the container is sniffed
//! from its header, decoded to 16-bit WAV, stretched by an external
//! soundstretch binary and re-encoded to Ogg Vorbis with ffmpeg.

pub mod audio;
pub mod convert;
pub mod encode;
pub mod error;
pub mod model;
pub mod process;
pub mod stretch;
pub mod validation;

pub use convert::{ConvertConfig, SpeedChanger};
pub use error::ConvertError;
pub use model::ConversionRequest;
