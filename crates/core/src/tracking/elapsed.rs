//! Elapsed seconds for a running ticket.

use chamados_domain::constants::{MAX_DRIFT_CORRECTED_SECONDS, SECONDS_PER_HOUR};
use chamados_domain::parse_timestamp;
use chrono::{DateTime, Utc};

/// Whole seconds from `started_at` to `now`, rounded toward negative infinity.
pub fn raw_elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - started_at).num_milliseconds().div_euclid(1_000)
}

/// Undo a whole-hour timezone mismatch between `startedAt` and the clock.
///
/// Some backend timestamps carry the wrong offset, which shows up as a start
/// time hours in the future. A negative `raw` is shifted by the nearest whole
/// number of hours; the result is accepted only if it lands in `[0, 1 day)`.
///
/// This is a heuristic. It assumes the error is a whole-hour offset and
/// cannot tell a mis-tagged timestamp from a genuinely future one.
pub fn correct_timezone_drift(raw: i64) -> Option<i64> {
    if raw >= 0 {
        return Some(raw);
    }

    let offset_hours = (raw.unsigned_abs() as f64 / SECONDS_PER_HOUR as f64).round() as i64;
    let adjusted = raw + offset_hours * SECONDS_PER_HOUR;
    (0..MAX_DRIFT_CORRECTED_SECONDS).contains(&adjusted).then_some(adjusted)
}

/// Elapsed seconds for a resolved `startedAt`, never negative.
///
/// When drift correction fails, `persisted_started_at` (the ledger's value)
/// is tried directly; if that is also unusable the result is 0.
pub fn compute_elapsed_seconds(
    started_at: Option<&str>,
    persisted_started_at: Option<&str>,
    now: DateTime<Utc>,
) -> u64 {
    let Some(started) = started_at.and_then(parse_timestamp) else {
        return 0;
    };

    let raw = raw_elapsed_seconds(started, now);
    let elapsed = correct_timezone_drift(raw).unwrap_or_else(|| {
        persisted_started_at
            .and_then(parse_timestamp)
            .map(|persisted| raw_elapsed_seconds(persisted, now))
            .filter(|secs| *secs >= 0)
            .unwrap_or(0)
    });

    u64::try_from(elapsed.max(0)).unwrap_or(0)
}
