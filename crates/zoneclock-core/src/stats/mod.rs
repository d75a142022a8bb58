//! Statistics module for Zoneclock
//!
//! Pure aggregation over persisted [`CycleRecord`](crate::CycleRecord)s:
//! daily and ranged totals, the 30-day trend, peak focus hours and the
//! weekday pattern. The [`Storage`](crate::storage::Storage) trait exposes
//! these as queries over its own records.

mod daily;
mod trend;

pub use daily::{
    aggregate, day_bounds, statistics_for_day, statistics_for_last_7_days, statistics_for_range,
    DailyStatistics,
};

pub use trend::{peak_focus_hours, trend_30_days, weekly_pattern, PeakHour, Trend, WeekdayFocus};
