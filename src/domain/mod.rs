//! Domain layer: core types, daily window math, and event system.
//!
//! This module contains the listing identity, activity rows, the daily
//! bounds calculator, the per-listing stats map and its snapshot, refresh
//! triggers, and the event bus broadcasting aggregate replacements.

pub mod activity;
pub mod daily_bounds;
pub mod daily_snapshot;
pub mod event_bus;
pub mod listing_id;
pub mod refresh_trigger;
pub mod refresh_zone;
pub mod stats_event;
pub mod stats_map;

pub use activity::{ActivityEvent, ActivityKind, ActivityRow};
pub use daily_bounds::{DEFAULT_STATS_TZ, DailyBounds};
pub use daily_snapshot::DailySnapshot;
pub use event_bus::EventBus;
pub use listing_id::ListingId;
pub use refresh_trigger::RefreshTrigger;
pub use refresh_zone::{FULL_DAY, RefreshZone};
pub use stats_event::StatsEvent;
pub use stats_map::{ListingStats, StatsMap};
