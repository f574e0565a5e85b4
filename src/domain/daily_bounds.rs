//! The inclusive query window covering "today" in a named time zone.
//!
//! "Today" is the local calendar date of the current instant in the
//! aggregation zone (`Asia/Jakarta` unless configured otherwise). The window
//! runs from local 00:00:00.000 to local 23:59:59.999 of that date, converted
//! to absolute UTC instants so it can be bound directly into the store query.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Default aggregation zone.
pub const DEFAULT_STATS_TZ: Tz = chrono_tz::Asia::Jakarta;

/// Offset of local 23:59:59.999 from local midnight on a day without
/// transitions.
const LAST_MILLISECOND_OF_DAY: i64 = 86_399_999;

/// How far before a DST gap to look for the offset in force before it.
const GAP_PROBE_HOURS: i64 = 3;

/// Inclusive `[start, end]` window of one local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyBounds {
    /// Local midnight as an absolute instant.
    pub start: DateTime<Utc>,
    /// Local 23:59:59.999 of the same date as an absolute instant.
    pub end: DateTime<Utc>,
}

impl DailyBounds {
    /// Bounds of the local day in `tz` that contains `instant`. With the
    /// current instant this is "today".
    #[must_use]
    pub fn containing<Z: TimeZone>(instant: DateTime<Utc>, tz: &Z) -> Self {
        Self::for_date(instant.with_timezone(tz).date_naive(), tz)
    }

    /// Bounds of the given local calendar date in `tz`.
    ///
    /// When local midnight is repeated by a backward transition the earliest
    /// instant is used; when local 23:59:59.999 is repeated the latest one is.
    /// A local time skipped by a forward transition resolves to the first
    /// valid instant after the gap.
    #[must_use]
    pub fn for_date<Z: TimeZone>(date: NaiveDate, tz: &Z) -> Self {
        let midnight = date.and_time(NaiveTime::MIN);
        let last_milli = midnight + TimeDelta::milliseconds(LAST_MILLISECOND_OF_DAY);
        Self {
            start: resolve_earliest(tz, midnight),
            end: resolve_latest(tz, last_milli),
        }
    }

    /// Returns `true` if `instant` falls inside the window (both ends
    /// inclusive).
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Local calendar date the window covers in `tz`.
    #[must_use]
    pub fn local_date<Z: TimeZone>(&self, tz: &Z) -> NaiveDate {
        self.start.with_timezone(tz).date_naive()
    }

    /// Length of the window.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Converts a local wall-clock time to an instant, taking the earlier of two
/// candidates in a fold.
pub(crate) fn resolve_earliest<Z: TimeZone>(tz: &Z, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .map_or_else(|| skip_gap(tz, local), |dt| dt.with_timezone(&Utc))
}

/// Converts a local wall-clock time to an instant, taking the later of two
/// candidates in a fold.
pub(crate) fn resolve_latest<Z: TimeZone>(tz: &Z, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .latest()
        .map_or_else(|| skip_gap(tz, local), |dt| dt.with_timezone(&Utc))
}

/// Resolves a local time that does not exist. Applying the offset in force
/// before the gap lands on the instant right after it.
fn skip_gap<Z: TimeZone>(tz: &Z, local: NaiveDateTime) -> DateTime<Utc> {
    let probe = local - TimeDelta::hours(GAP_PROBE_HOURS);
    let offset_secs = tz
        .from_local_datetime(&probe)
        .earliest()
        .map_or(0, |dt| dt.offset().fix().local_minus_utc());
    (local - TimeDelta::seconds(i64::from(offset_secs))).and_utc()
}
