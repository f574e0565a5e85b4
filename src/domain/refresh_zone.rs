//! Zone whose midnight schedules the daily refresh.
//!
//! This is deliberately separate from the aggregation zone: by default the
//! refresh fires at the host's local midnight while "today" is defined in
//! `Asia/Jakarta`. Set `REFRESH_TIME_ZONE` to align the two.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::daily_bounds::resolve_earliest;

/// One calendar day, the fallback delay and the recurring refresh period.
pub const FULL_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Time zone used to compute the next midnight refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshZone {
    /// The host process' local zone.
    HostLocal,
    /// An explicit IANA zone.
    Named(Tz),
}

impl RefreshZone {
    /// Delay from `now` until the next local midnight in this zone.
    #[must_use]
    pub fn until_next_midnight(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::HostLocal => until_next_local_midnight(now, &Local),
            Self::Named(tz) => until_next_local_midnight(now, tz),
        }
    }
}

impl fmt::Display for RefreshZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostLocal => f.write_str("host-local"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Delay from `now` until the start of the next local date in `tz`.
///
/// Always in `(0, 24h]` for zones without transitions; exactly 24 h when
/// `now` is itself a local midnight.
pub fn until_next_local_midnight<Z: TimeZone>(now: DateTime<Utc>, tz: &Z) -> Duration {
    now.with_timezone(tz)
        .date_naive()
        .succ_opt()
        .map(|next| resolve_earliest(tz, next.and_time(NaiveTime::MIN)))
        .and_then(|midnight| (midnight - now).to_std().ok())
        .unwrap_or(FULL_DAY)
}
