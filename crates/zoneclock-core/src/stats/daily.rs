//! Daily aggregates over persisted cycle records.
//!
//! Records are bucketed by the UTC day of `ended_at`. Break time is not
//! tracked per break: each completed cycle is credited with the configured
//! break duration.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cycle::CycleRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStatistics {
    pub date: NaiveDate,
    pub total_focus_minutes: u64,
    pub completed_cycles: u32,
    pub total_cycles: u32,
    pub micro_breaks_count: u32,
    /// Mean of the per-record completion rates (0.0 to 1.0)
    pub average_completion_rate: f64,
    pub total_break_minutes: u64,
}

impl DailyStatistics {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_focus_minutes: 0,
            completed_cycles: 0,
            total_cycles: 0,
            micro_breaks_count: 0,
            average_completion_rate: 0.0,
            total_break_minutes: 0,
        }
    }

    /// Share of cycles that ran to completion.
    pub fn cycle_completion_ratio(&self) -> f64 {
        if self.total_cycles == 0 {
            return 0.0;
        }
        f64::from(self.completed_cycles) / f64::from(self.total_cycles)
    }

    /// Focused minutes per completed cycle.
    pub fn average_focus_minutes(&self) -> u64 {
        if self.completed_cycles == 0 {
            return 0;
        }
        self.total_focus_minutes / u64::from(self.completed_cycles)
    }
}

/// Fold a set of records into one aggregate labelled `date`.
pub fn aggregate<'a, I>(records: I, date: NaiveDate, break_minutes: u32) -> DailyStatistics
where
    I: IntoIterator<Item = &'a CycleRecord>,
{
    let mut stats = DailyStatistics::empty(date);
    let mut rate_sum = 0.0;

    for record in records {
        stats.total_cycles += 1;
        stats.total_focus_minutes += record.focus_minutes();
        stats.micro_breaks_count += record.micro_breaks;
        rate_sum += record.completion_rate;
        if record.was_completed {
            stats.completed_cycles += 1;
        }
    }

    if stats.total_cycles > 0 {
        stats.average_completion_rate = rate_sum / f64::from(stats.total_cycles);
    }
    stats.total_break_minutes = u64::from(stats.completed_cycles) * u64::from(break_minutes);
    stats
}

pub fn statistics_for_day(
    records: &[CycleRecord],
    day: NaiveDate,
    break_minutes: u32,
) -> DailyStatistics {
    aggregate(
        records.iter().filter(|r| r.ended_at.date_naive() == day),
        day,
        break_minutes,
    )
}

/// Seven daily aggregates ending with `today`, oldest first.
pub fn statistics_for_last_7_days(
    records: &[CycleRecord],
    today: NaiveDate,
    break_minutes: u32,
) -> Vec<DailyStatistics> {
    (0..7)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            statistics_for_day(records, day, break_minutes)
        })
        .collect()
}

/// One aggregate over every record with `start <= ended_at <= end`.
pub fn statistics_for_range(
    records: &[CycleRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    break_minutes: u32,
) -> DailyStatistics {
    aggregate(
        records
            .iter()
            .filter(|r| r.ended_at >= start && r.ended_at <= end),
        start.date_naive(),
        break_minutes,
    )
}

/// First and last instant of a UTC day, for range queries.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::seconds(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(ended_at: &str, actual_seconds: i64, completed: bool, micro: u32) -> CycleRecord {
        let ended_at = DateTime::parse_from_rfc3339(ended_at)
            .unwrap()
            .with_timezone(&Utc);
        CycleRecord {
            id: Uuid::new_v4(),
            cycle_id: Uuid::new_v4(),
            started_at: ended_at - Duration::seconds(actual_seconds),
            ended_at,
            planned_minutes: 25,
            actual_seconds,
            paused_seconds: 0,
            micro_breaks: micro,
            completion_rate: (actual_seconds as f64 / 1500.0).min(1.0),
            was_completed: completed,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn day_aggregate_counts_only_that_day() {
        let records = vec![
            record("2026-03-02T10:00:00Z", 1500, true, 6),
            record("2026-03-02T15:00:00Z", 750, false, 3),
            record("2026-03-03T09:00:00Z", 1500, true, 5),
        ];
        let stats = statistics_for_day(&records, day("2026-03-02"), 5);
        assert_eq!(stats.total_cycles, 2);
        assert_eq!(stats.completed_cycles, 1);
        assert_eq!(stats.total_focus_minutes, 25 + 12);
        assert_eq!(stats.micro_breaks_count, 9);
        assert_eq!(stats.total_break_minutes, 5);
        assert!((stats.average_completion_rate - 0.75).abs() < 1e-9);
        assert!((stats.cycle_completion_ratio() - 0.5).abs() < 1e-9);
        assert_eq!(stats.average_focus_minutes(), 37);
    }

    #[test]
    fn empty_day_is_zeroed() {
        let stats = statistics_for_day(&[], day("2026-03-02"), 20);
        assert_eq!(stats, DailyStatistics::empty(day("2026-03-02")));
        assert_eq!(stats.cycle_completion_ratio(), 0.0);
    }

    #[test]
    fn last_seven_days_are_oldest_first() {
        let records = vec![
            record("2026-03-08T10:00:00Z", 1500, true, 0),
            record("2026-03-02T10:00:00Z", 1500, true, 0),
            record("2026-03-01T10:00:00Z", 1500, true, 0),
        ];
        let week = statistics_for_last_7_days(&records, day("2026-03-08"), 20);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day("2026-03-02"));
        assert_eq!(week[6].date, day("2026-03-08"));
        assert_eq!(week[0].completed_cycles, 1);
        assert_eq!(week[6].completed_cycles, 1);
        let total: u32 = week.iter().map(|d| d.total_cycles).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn range_is_inclusive() {
        let records = vec![
            record("2026-03-02T00:00:00Z", 600, false, 0),
            record("2026-03-04T23:59:59Z", 600, false, 0),
            record("2026-03-05T00:00:00Z", 600, false, 0),
        ];
        let (start, _) = day_bounds(day("2026-03-02"));
        let (_, end) = day_bounds(day("2026-03-04"));
        let stats = statistics_for_range(&records, start, end, 20);
        assert_eq!(stats.total_cycles, 2);
        assert_eq!(stats.total_break_minutes, 0);
        assert_eq!(stats.date, day("2026-03-02"));
    }
}
