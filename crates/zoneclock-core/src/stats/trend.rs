//! Longer-horizon analysis: 30-day trend, peak focus hours, weekday pattern.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::cycle::CycleRecord;

const TREND_WINDOW_DAYS: i64 = 30;

/// Relative change of the last 30 days against the 30 days before.
///
/// `0.15` means fifteen percent better than the previous window. Both ratios
/// are `0.0` when the previous window has nothing to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Trend {
    pub focus_time_improvement: f64,
    pub completion_rate_improvement: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakHour {
    /// Hour of day (0-23, UTC)
    pub hour: u32,
    /// Focused time in this hour relative to the best hour (0.0 to 1.0)
    pub productivity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayFocus {
    pub weekday: String,
    pub focus_minutes: u64,
}

#[derive(Default)]
struct Window {
    focus_minutes: u64,
    rate_sum: f64,
    count: u32,
}

impl Window {
    fn average_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.rate_sum / f64::from(self.count)
        }
    }
}

fn improvement(current: f64, previous: f64) -> f64 {
    if previous <= 0.0 {
        0.0
    } else {
        (current - previous) / previous
    }
}

pub fn trend_30_days(records: &[CycleRecord], now: DateTime<Utc>) -> Trend {
    let current_start = now - Duration::days(TREND_WINDOW_DAYS);
    let previous_start = current_start - Duration::days(TREND_WINDOW_DAYS);

    let mut current = Window::default();
    let mut previous = Window::default();

    for record in records {
        let bucket = if record.ended_at > current_start && record.ended_at <= now {
            &mut current
        } else if record.ended_at > previous_start && record.ended_at <= current_start {
            &mut previous
        } else {
            continue;
        };
        bucket.focus_minutes += record.focus_minutes();
        bucket.rate_sum += record.completion_rate;
        bucket.count += 1;
    }

    Trend {
        focus_time_improvement: improvement(
            current.focus_minutes as f64,
            previous.focus_minutes as f64,
        ),
        completion_rate_improvement: improvement(current.average_rate(), previous.average_rate()),
    }
}

/// Hours with the most focused time, best first.
pub fn peak_focus_hours(records: &[CycleRecord], top_n: usize) -> Vec<PeakHour> {
    let mut seconds_by_hour = [0i64; 24];
    for record in records {
        seconds_by_hour[record.started_at.hour() as usize] += record.actual_seconds.max(0);
    }

    let best = seconds_by_hour.iter().copied().max().unwrap_or(0);
    if best == 0 {
        return Vec::new();
    }

    let mut hours: Vec<PeakHour> = seconds_by_hour
        .iter()
        .enumerate()
        .filter(|(_, secs)| **secs > 0)
        .map(|(hour, secs)| PeakHour {
            hour: hour as u32,
            productivity_score: *secs as f64 / best as f64,
        })
        .collect();

    hours.sort_by(|a, b| {
        b.productivity_score
            .total_cmp(&a.productivity_score)
            .then(a.hour.cmp(&b.hour))
    });
    hours.truncate(top_n);
    hours
}

/// Focused minutes per weekday, Monday first.
pub fn weekly_pattern(records: &[CycleRecord]) -> Vec<WeekdayFocus> {
    const DAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    let mut minutes = [0u64; 7];
    for record in records {
        let idx = record.ended_at.weekday().num_days_from_monday() as usize;
        minutes[idx] += record.focus_minutes();
    }
    DAYS.iter()
        .zip(minutes)
        .map(|(day, focus_minutes)| WeekdayFocus {
            weekday: day.to_string(),
            focus_minutes,
        })
        .collect()
}
