//! Data model for a speed-change job

mod request;

pub use request::{ConversionRequest, Quality, MIN_TEMPO_BASIS, RATE_DOUBLING_FACTOR};
