use chrono::{Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::error::{LoaderError, Result};

/// `strptime`-style layout of the joined header lines, e.g. `12/9/2013_7:28:06 PM`.
pub const HEADER_TIME_FORMAT: &str = "%m/%d/%Y_%I:%M:%S %p";

/// Separator placed between the date line and the time line before parsing.
pub const HEADER_TIME_SEPARATOR: char = '_';

/// Output layout for derived absolute timestamps.
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a timezone option into a [`Tz`].
///
/// `"auto"` (any case) selects the system timezone; anything else must be a
/// recognised IANA identifier.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    let resolved = if name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    };

    resolved.parse::<Tz>().map_err(|_| {
        warn!("unrecognised timezone \"{}\"", resolved);
        LoaderError::InvalidTimezone(resolved.clone())
    })
}

// ── Header time parsing ───────────────────────────────────────────────────────

/// Parse the two header fragments (`month/day/year` and
/// `hour:minute:second AM|PM`) into a naive calendar time.
///
/// Surrounding whitespace on either fragment is ignored.
pub fn parse_header_time(date_part: &str, time_part: &str) -> Result<NaiveDateTime> {
    let joined = format!(
        "{}{}{}",
        date_part.trim(),
        HEADER_TIME_SEPARATOR,
        time_part.trim()
    );

    let parsed = NaiveDateTime::parse_from_str(&joined, HEADER_TIME_FORMAT)
        .map_err(|e| LoaderError::TimeParse(format!("\"{joined}\": {e}")))?;

    debug!("parsed header time \"{}\" as {}", joined, parsed);
    Ok(parsed)
}

// ── Offsets ───────────────────────────────────────────────────────────────────

/// Convert a relative offset in seconds into a [`Duration`] with nanosecond
/// resolution.
///
/// Returns `None` for non-finite values and offsets outside the range a
/// `Duration` can represent.
pub fn offset_to_duration(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() {
        return None;
    }
    let nanos = (seconds * 1e9).round();
    if nanos.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::nanoseconds(nanos as i64))
}

/// Add a relative offset in seconds to `base`.
pub fn add_offset(base: NaiveDateTime, seconds: f64) -> Result<NaiveDateTime> {
    offset_to_duration(seconds)
        .and_then(|d| base.checked_add_signed(d))
        .ok_or_else(|| {
            LoaderError::TimeParse(format!(
                "offset {seconds} s from {base} is not a valid calendar timestamp"
            ))
        })
}

// ── Epoch conversion ──────────────────────────────────────────────────────────

/// Seconds since the Unix epoch for a wall-clock time observed in `tz`.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// non-existent local times (DST spring-forward gap) yield `None`.
pub fn to_epoch_seconds(naive: NaiveDateTime, tz: Tz) -> Option<f64> {
    let dt = tz.from_local_datetime(&naive).earliest()?;
    Some(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9)
}

/// Render a timestamp using [`TIMESTAMP_DISPLAY_FORMAT`].
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_DISPLAY_FORMAT).to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
