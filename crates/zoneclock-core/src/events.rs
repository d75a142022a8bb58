use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::AppState;
use crate::timer::Phase;

/// Every state change in the timer produces an Event.
/// The CLI prints them; other front-ends subscribe through the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CycleStarted {
        cycle_id: Uuid,
        planned_minutes: u32,
        next_micro_break_at: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    MicroBreakStarted {
        cycle_id: Uuid,
        sequence: u32,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    MicroBreakEnded {
        sequence: u32,
        next_micro_break_at: u64,
        at: DateTime<Utc>,
    },
    /// Focus ran to zero; the long break has started.
    CycleCompleted {
        cycle_id: Uuid,
        actual_seconds: i64,
        micro_breaks: u32,
        break_minutes: u32,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        cycle_id: Uuid,
        at: DateTime<Utc>,
    },
    BreakSkipped {
        cycle_id: Uuid,
        at: DateTime<Utc>,
    },
    /// Timer reset to idle from any phase.
    TimerStopped {
        phase: Phase,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        app_state: AppState,
        phase: Phase,
        is_running: bool,
        elapsed_secs: u64,
        remaining_secs: u64,
        micro_break_countdown: u32,
        next_micro_break_at: u64,
        progress: f64,
        do_not_disturb: bool,
        at: DateTime<Utc>,
    },
}
