//! Focus cycle model and its persisted snapshot.
//!
//! A [`Cycle`] is owned by the session manager while it runs. Once it reaches
//! a terminal status it is frozen into a [`CycleRecord`] for statistics.
//!
//! ## Status Transitions
//!
//! ```text
//! Active <-> Paused
//! Active -> Completed
//! Active | Paused -> Stopped
//! ```
//!
//! Every method takes the current instant explicitly so bookkeeping follows
//! whatever clock the owner uses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Active,
    Paused,
    Completed,
    Stopped,
}

impl CycleStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleStatus::Completed | CycleStatus::Stopped)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub id: Uuid,
    status: CycleStatus,
    pub start_time: DateTime<Utc>,
    /// Planned length in minutes.
    pub planned_minutes: u32,
    end_time: Option<DateTime<Utc>>,
    /// Focused seconds, fixed when the cycle completes or stops.
    actual_seconds: i64,
    /// Accumulated seconds spent paused.
    paused_seconds: i64,
    micro_break_count: u32,
    #[serde(default)]
    pause_started_at: Option<DateTime<Utc>>,
}

impl Cycle {
    pub fn new(planned_minutes: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: CycleStatus::Active,
            start_time: now,
            planned_minutes,
            end_time: None,
            actual_seconds: 0,
            paused_seconds: 0,
            micro_break_count: 0,
            pause_started_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> CycleStatus {
        self.status
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn actual_seconds(&self) -> i64 {
        self.actual_seconds
    }

    pub fn paused_seconds(&self) -> i64 {
        self.paused_seconds
    }

    pub fn micro_break_count(&self) -> u32 {
        self.micro_break_count
    }

    pub fn planned_seconds(&self) -> i64 {
        i64::from(self.planned_minutes) * 60
    }

    /// Focused seconds so far. For a running or paused cycle this is the
    /// wall time since start minus every pause, including one in progress.
    pub fn live_seconds(&self, now: DateTime<Utc>) -> i64 {
        match self.status {
            CycleStatus::Completed | CycleStatus::Stopped => self.actual_seconds,
            CycleStatus::Active | CycleStatus::Paused => {
                let elapsed = (now - self.start_time).num_seconds().max(0);
                let running_pause = self
                    .pause_started_at
                    .map(|p| (now - p).num_seconds().max(0))
                    .unwrap_or(0);
                (elapsed - self.paused_seconds - running_pause).max(0)
            }
        }
    }

    /// Fraction of the planned duration spent focusing, clamped to `[0, 1]`.
    pub fn completion_rate(&self, now: DateTime<Utc>) -> f64 {
        let planned = self.planned_seconds();
        if planned <= 0 {
            return 0.0;
        }
        (self.live_seconds(now) as f64 / planned as f64).clamp(0.0, 1.0)
    }

    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        self.completion_rate(now)
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.planned_seconds() - self.live_seconds(now)).max(0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `false` when the cycle is not active.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != CycleStatus::Active {
            return false;
        }
        self.status = CycleStatus::Paused;
        self.pause_started_at = Some(now);
        true
    }

    /// Returns `false` when the cycle is not paused.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != CycleStatus::Paused {
            return false;
        }
        self.fold_running_pause(now);
        self.status = CycleStatus::Active;
        true
    }

    pub fn stop(&mut self, now: DateTime<Utc>) -> bool {
        if !matches!(self.status, CycleStatus::Active | CycleStatus::Paused) {
            return false;
        }
        self.fold_running_pause(now);
        self.finish(CycleStatus::Stopped, now);
        true
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != CycleStatus::Active {
            return false;
        }
        self.finish(CycleStatus::Completed, now);
        true
    }

    pub fn record_micro_break(&mut self) {
        self.micro_break_count += 1;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fold_running_pause(&mut self, now: DateTime<Utc>) {
        if let Some(started) = self.pause_started_at.take() {
            self.paused_seconds += (now - started).num_seconds().max(0);
        }
    }

    fn finish(&mut self, status: CycleStatus, now: DateTime<Utc>) {
        self.status = status;
        self.end_time = Some(now);
        let wall = (now - self.start_time).num_seconds().max(0);
        // paused_seconds <= wall time since start
        self.paused_seconds = self.paused_seconds.min(wall);
        self.actual_seconds = wall - self.paused_seconds;
    }
}

/// Immutable snapshot of a completed or stopped cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub planned_minutes: u32,
    pub actual_seconds: i64,
    pub paused_seconds: i64,
    pub micro_breaks: u32,
    pub completion_rate: f64,
    /// `true` when the cycle ran to completion, `false` when stopped early.
    pub was_completed: bool,
}

impl CycleRecord {
    /// Snapshot a terminal cycle. Returns `None` while the cycle is still
    /// active or paused.
    pub fn from_cycle(cycle: &Cycle) -> Option<Self> {
        if !cycle.status().is_terminal() {
            return None;
        }
        let ended_at = cycle.end_time()?;
        Some(Self {
            id: Uuid::new_v4(),
            cycle_id: cycle.id,
            started_at: cycle.start_time,
            ended_at,
            planned_minutes: cycle.planned_minutes,
            actual_seconds: cycle.actual_seconds(),
            paused_seconds: cycle.paused_seconds(),
            micro_breaks: cycle.micro_break_count(),
            completion_rate: cycle.completion_rate(ended_at),
            was_completed: cycle.status() == CycleStatus::Completed,
        })
    }

    pub fn focus_minutes(&self) -> u64 {
        (self.actual_seconds.max(0) / 60) as u64
    }
}
