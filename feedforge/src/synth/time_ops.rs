//! codec between GTFS time strings (HH:MM:SS) and integer seconds past
//! midnight. in keeping with the GTFS reference, the hours field may exceed
//! 23 for service running past midnight, so the two functions below are used
//! instead of a clock type.
use serde::{de::Error, Deserialize, Deserializer};

use crate::synth::SynthError;

/// render integer seconds past midnight as an HH:MM:SS string.
/// exact inverse of [timestr_to_seconds] for all inputs.
pub fn seconds_to_timestr(seconds: u32) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

/// parse an HH:MM:SS string into integer seconds past midnight.
/// the hours field may be any non-negative integer; minutes and seconds
/// must be below 60. malformed strings produce an error, never a panic.
pub fn timestr_to_seconds(timestr: &str) -> Result<u32, SynthError> {
    let invalid = || SynthError::InvalidTimeString(timestr.to_string());
    let mut parts = timestr.split(':');
    let (h, m, s) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(invalid()),
    };
    let hours: u32 = h.parse().map_err(|_| invalid())?;
    let mins: u32 = m.parse().map_err(|_| invalid())?;
    let secs: u32 = s.parse().map_err(|_| invalid())?;
    if mins > 59 || secs > 59 {
        return Err(invalid());
    }
    Ok(hours * 3600 + mins * 60 + secs)
}

/// deserialize an HH:MM:SS string into seconds past midnight
pub fn deserialize_time_seconds<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    timestr_to_seconds(&s).map_err(D::Error::custom)
}
