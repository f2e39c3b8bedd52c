//! Post-conversion checks on the encoded file

mod probe;

pub use probe::{duration_matches, expected_duration, probe_output, OutputInfo, DURATION_TOLERANCE};
