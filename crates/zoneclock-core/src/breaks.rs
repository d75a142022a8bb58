//! Micro-break and long-break models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of every micro-break. Not configurable.
pub const MICRO_BREAK_SECS: u32 = 10;

/// A short pause triggered during an active focus cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroBreak {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub triggered_at: DateTime<Utc>,
    /// 1-based position within the cycle.
    pub sequence: u32,
    /// Gap in seconds until the following micro-break.
    pub next_interval_secs: u32,
}

impl MicroBreak {
    pub fn new(
        cycle_id: Uuid,
        sequence: u32,
        next_interval_secs: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            cycle_id,
            triggered_at: now,
            sequence,
            next_interval_secs,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        MICRO_BREAK_SECS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongBreakStatus {
    Active,
    Completed,
    Skipped,
}

/// The rest period that follows a completed cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongBreak {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Length in minutes.
    pub duration_minutes: u32,
    status: LongBreakStatus,
    end_time: Option<DateTime<Utc>>,
}

impl LongBreak {
    pub fn new(cycle_id: Uuid, duration_minutes: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cycle_id,
            start_time: now,
            duration_minutes,
            status: LongBreakStatus::Active,
            end_time: None,
        }
    }

    pub fn status(&self) -> LongBreakStatus {
        self.status
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn planned_seconds(&self) -> i64 {
        i64::from(self.duration_minutes) * 60
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = (now - self.start_time).num_seconds().max(0);
        (self.planned_seconds() - elapsed).max(0)
    }

    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let planned = self.planned_seconds();
        if planned <= 0 {
            return 0.0;
        }
        let elapsed = (now - self.start_time).num_seconds().max(0);
        (elapsed as f64 / planned as f64).min(1.0)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        self.finish(LongBreakStatus::Completed, now)
    }

    pub fn skip(&mut self, now: DateTime<Utc>) -> bool {
        self.finish(LongBreakStatus::Skipped, now)
    }

    fn finish(&mut self, status: LongBreakStatus, now: DateTime<Utc>) -> bool {
        if self.status != LongBreakStatus::Active {
            return false;
        }
        self.status = status;
        self.end_time = Some(now);
        true
    }
}
