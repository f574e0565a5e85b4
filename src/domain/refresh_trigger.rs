//! What caused a refresh of the daily aggregate.

use std::fmt;

use serde::Serialize;

/// Reason a fetch was started. Every trigger starts exactly one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    /// First fetch right after attaching.
    Initial,
    /// The store reported a new row in the activity log.
    Insert,
    /// One-shot timer at the first local midnight after attaching.
    Midnight,
    /// Recurring 24 h timer following the first midnight.
    Interval,
}

impl RefreshTrigger {
    /// Returns the trigger as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Insert => "insert",
            Self::Midnight => "midnight",
            Self::Interval => "interval",
        }
    }
}

impl fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        let json = serde_json::to_string(&RefreshTrigger::Midnight).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", RefreshTrigger::Midnight));
    }
}
