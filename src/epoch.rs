use chrono::{DateTime, Datelike, Utc};

use crate::errors::{Result, TrajframeError};

/// Returns the decimal year of the given UTC timestamp.
///
/// Year plus elapsed months and days: `year + (month - 1) / 12 + (day - 1) / 365.25`.
pub fn decimal_year(time: &DateTime<Utc>) -> f64 {
    time.year() as f64 + (time.month0() as f64) / 12.0 + (time.day0() as f64) / 365.25
}

/// Returns the UTC date of a UNIX timestamp in seconds.
pub fn datetime_from_unix(seconds: f64) -> Result<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(TrajframeError::InvalidTimestamp(seconds));
    }
    let secs = seconds.floor();
    let nanos = ((seconds - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos)
        .ok_or(TrajframeError::InvalidTimestamp(seconds))
}

/// Derives the transformation epoch from the mean of the given UNIX timestamps.
pub fn mean_epoch(tstamps: &[f64]) -> Result<f64> {
    if tstamps.is_empty() {
        return Err(TrajframeError::EmptyTrajectory);
    }
    let mean = tstamps.iter().sum::<f64>() / tstamps.len() as f64;
    Ok(decimal_year(&datetime_from_unix(mean)?))
}
