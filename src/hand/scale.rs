// Percentage validation and rescaling
//
// Human-facing values are percentages in [0, 100]; the protocols want
// integers in [0, max]. Out-of-range input is rejected, never clamped.

use crate::config::ROBOTIQ_MODE_MAX;
use crate::error::{HandError, Result};

/// Reject anything outside [0, 100] (NaN included)
pub fn check_percentage(field: &'static str, value: f64) -> Result<f64> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(HandError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 100.0,
        })
    }
}

/// Rescale a validated percentage to [0, max], rounding to nearest
pub fn percent_to_raw(field: &'static str, percentage: f64, max: u8) -> Result<u8> {
    let p = check_percentage(field, percentage)?;
    Ok((f64::from(max) * p / 100.0).round() as u8)
}

/// Grasp mode must be in [0, 4]
pub fn check_mode(mode: i32) -> Result<u8> {
    if (0..=i32::from(ROBOTIQ_MODE_MAX)).contains(&mode) {
        Ok(mode as u8)
    } else {
        Err(HandError::OutOfRange {
            field: "mode",
            value: f64::from(mode),
            min: 0.0,
            max: f64::from(ROBOTIQ_MODE_MAX),
        })
    }
}
