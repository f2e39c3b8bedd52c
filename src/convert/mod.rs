//! Conversion orchestration

pub mod config;
pub mod pipeline;
pub mod temp;

pub use config::ConvertConfig;
pub use pipeline::{ConversionSummary, SpeedChanger};
pub use temp::TempArtifact;
