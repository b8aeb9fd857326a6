//! SRT time-code conversion

use thiserror::Error;

/// Errors produced while converting a `HH:MM:SS,mmm` time-code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimecodeError {
    #[error("Expected 3 colon-separated components, found {found}")]
    WrongComponentCount { found: usize },

    #[error("Non-numeric time-code component: {0:?}")]
    NotNumeric(String),
}

/// Convert an SRT time-code (`HH:MM:SS,mmm`) into seconds.
///
/// The comma is the decimal separator of the seconds field. Hours are not
/// bounded, so `25:00:00,000` is simply `90000.0`.
pub fn parse_timecode(timecode: &str) -> Result<f64, TimecodeError> {
    let normalized = timecode.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() != 3 {
        return Err(TimecodeError::WrongComponentCount { found: parts.len() });
    }

    let hours = parse_whole(parts[0])?;
    let minutes = parse_whole(parts[1])?;
    let seconds = parse_fraction(parts[2])?;

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

fn parse_whole(component: &str) -> Result<u64, TimecodeError> {
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimecodeError::NotNumeric(component.to_string()));
    }
    component
        .parse::<u64>()
        .map_err(|_| TimecodeError::NotNumeric(component.to_string()))
}

// seconds[.fraction], digits only; rejects signs, exponents, "inf" and friends.
// An empty fraction ("03.") reads as whole seconds.
fn parse_fraction(component: &str) -> Result<f64, TimecodeError> {
    let (whole, frac) = component.split_once('.').unwrap_or((component, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !all_digits(whole) || !all_digits(frac) {
        return Err(TimecodeError::NotNumeric(component.to_string()));
    }
    let frac = if frac.is_empty() { "0" } else { frac };
    format!("{}.{}", whole, frac)
        .parse::<f64>()
        .map_err(|_| TimecodeError::NotNumeric(component.to_string()))
}
