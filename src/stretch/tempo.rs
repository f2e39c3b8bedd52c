//! Tempo and pitch arithmetic for the stretch tool

use super::traits::StretchParams;
use crate::model::ConversionRequest;

/// Percentage tempo change for a multiplier (`1.5` -> `50.0`)
pub fn tempo_percent(basis: f64) -> f64 {
    (basis - 1.0) * 100.0
}

/// Pitch shift in semitones that matches a speed multiplier
///
/// 1200 cents per octave, 100 cents per semitone.
pub fn pitch_semitones(multiplier: f64) -> f64 {
    let cents = 1200.0 * multiplier.log2();
    cents / 100.0
}

/// Compute the stretch parameters for a request
///
/// Tempo uses the compensated basis; pitch always follows the effective multiplier.
pub fn plan(request: &ConversionRequest) -> StretchParams {
    let tempo = tempo_percent(request.tempo_basis());
    let pitch = request
        .change_pitch
        .then(|| pitch_semitones(request.speed_multiplier));

    StretchParams {
        tempo_percent: tempo,
        pitch_semitones: pitch,
        quality: request.quality(),
    }
}

/// Render a number for a command-line flag: at most 4 decimals, no trailing zeros
pub fn format_number(value: f64) -> String {
    let rounded = format!("{:.4}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
