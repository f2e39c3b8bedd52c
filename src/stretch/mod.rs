//! Time-stretch layer
//!
//! The stretch itself is done by an external tool behind the [`Stretcher`]
//! trait; this module only computes its parameters and builds the command.

mod soundstretch;
pub mod tempo;
mod traits;

pub use soundstretch::SoundStretch;
pub use tempo::plan;
pub use traits::{StretchParams, Stretcher};
