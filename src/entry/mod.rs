//! Journal entries
//!
//! - **types**: `DailyEntry`, `SlotLevels`, `DayAggregate`, `Metric`
//! - **adapter**: normalization of raw entries into per-day averages

pub mod adapter;
pub mod types;

pub use adapter::{normalize, normalize_entry};
pub use types::{chronological_key, parse_date, DailyEntry, DayAggregate, Metric, SlotLevels, TimeSlot, DATE_FORMAT};
