//! Timer engine implementation.
//!
//! The engine counts seconds for the focus phase, micro-breaks and the long
//! break. It owns no thread: the caller fires the armed tick token once per
//! second and passes the session manager along, so the session always
//! outlives the engine's use of it.
//!
//! ## Phase Transitions
//!
//! ```text
//! Idle -> Focusing -> MicroBreak -> Focusing -> LongBreak -> Idle
//!   (any) -> Idle on stop
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! session.start_focus_cycle(None)?;
//! engine.start_focus_cycle(&mut session);
//! // Once per second:
//! engine.tick(&mut session);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ticks::{TickSlots, TickSource, TickToken};
use crate::breaks::MICRO_BREAK_SECS;
use crate::cycle::CycleStatus;
use crate::events::Event;
use crate::ports::{AudioPlayer, NoopAudio, NoopNotifier, Notifier};
use crate::session::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Focusing,
    MicroBreak,
    LongBreak,
}

/// Core timer engine.
pub struct TimerEngine {
    phase: Phase,
    is_running: bool,
    elapsed_secs: u64,
    remaining_secs: u64,
    /// Elapsed-seconds mark at which the next micro-break is due.
    next_micro_break_at: u64,
    micro_break_countdown: u32,
    slots: TickSlots,
    notifier: Box<dyn Notifier>,
    audio: Box<dyn AudioPlayer>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Box::new(NoopNotifier), Box::new(NoopAudio))
    }
}

impl TimerEngine {
    pub fn new(notifier: Box<dyn Notifier>, audio: Box<dyn AudioPlayer>) -> Self {
        Self {
            phase: Phase::Idle,
            is_running: false,
            elapsed_secs: 0,
            remaining_secs: 0,
            next_micro_break_at: 0,
            micro_break_countdown: 0,
            slots: TickSlots::default(),
            notifier,
            audio,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn micro_break_countdown(&self) -> u32 {
        self.micro_break_countdown
    }

    pub fn next_micro_break_at(&self) -> u64 {
        self.next_micro_break_at
    }

    /// The token the next tick must carry, if any source is armed.
    pub fn armed(&self) -> Option<TickToken> {
        self.slots.armed()
    }

    pub fn formatted_remaining(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    pub fn formatted_elapsed(&self) -> String {
        format_mm_ss(self.elapsed_secs)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self, session: &SessionManager) -> f64 {
        let total = match self.phase {
            Phase::Focusing | Phase::MicroBreak => session
                .current_cycle()
                .map(|c| u64::from(c.planned_minutes) * 60),
            Phase::LongBreak => session
                .current_break()
                .map(|b| u64::from(b.duration_minutes) * 60),
            Phase::Idle => None,
        };
        match total {
            Some(total) if total > 0 => (self.elapsed_secs as f64 / total as f64).min(1.0),
            _ => 0.0,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, session: &SessionManager) -> Event {
        Event::StateSnapshot {
            app_state: session.state(),
            phase: self.phase,
            is_running: self.is_running,
            elapsed_secs: self.elapsed_secs,
            remaining_secs: self.remaining_secs,
            micro_break_countdown: self.micro_break_countdown,
            next_micro_break_at: self.next_micro_break_at,
            progress: self.progress(session),
            do_not_disturb: session.is_do_not_disturb(),
            at: session.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin counting the session's current cycle. The session must already
    /// be focusing on an active cycle.
    pub fn start_focus_cycle(&mut self, session: &mut SessionManager) -> Option<Event> {
        if self.phase != Phase::Idle || !session.has_active_cycle() {
            return None;
        }
        let cycle = session.current_cycle()?;
        let cycle_id = cycle.id;
        let planned_minutes = cycle.planned_minutes;

        self.phase = Phase::Focusing;
        self.elapsed_secs = 0;
        self.remaining_secs = u64::from(planned_minutes) * 60;
        self.micro_break_countdown = 0;
        self.is_running = true;
        self.schedule_next_micro_break(session);
        self.slots.arm(TickSource::Main);

        Some(Event::CycleStarted {
            cycle_id,
            planned_minutes,
            next_micro_break_at: self.next_micro_break_at,
            at: session.now(),
        })
    }

    /// Fire whichever source is armed.
    pub fn tick(&mut self, session: &mut SessionManager) -> Option<Event> {
        let token = self.slots.armed()?;
        self.fire(token, session)
    }

    /// Fire a specific token. Stale tokens are ignored.
    pub fn fire(&mut self, token: TickToken, session: &mut SessionManager) -> Option<Event> {
        if !self.is_running || !self.slots.is_current(token) {
            debug!(?token, "ignoring stale tick");
            return None;
        }
        match token.source {
            TickSource::Main => self.main_tick(session),
            TickSource::MicroBreak => self.micro_break_tick(session),
        }
    }

    pub fn pause_timer(&mut self, session: &SessionManager) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        self.slots.disarm_all();
        self.is_running = false;
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: session.now(),
        })
    }

    /// Re-arm the source for the current phase. Resuming into focus draws a
    /// fresh micro-break interval from the current elapsed mark.
    pub fn resume_timer(&mut self, session: &mut SessionManager) -> Option<Event> {
        if self.is_running || self.phase == Phase::Idle {
            return None;
        }
        self.is_running = true;
        match self.phase {
            Phase::MicroBreak => {
                self.slots.arm(TickSource::MicroBreak);
            }
            Phase::Focusing => {
                self.schedule_next_micro_break(session);
                self.slots.arm(TickSource::Main);
            }
            Phase::LongBreak | Phase::Idle => {
                self.slots.arm(TickSource::Main);
            }
        }
        Some(Event::TimerResumed {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: session.now(),
        })
    }

    /// End the long break early. The session must be resting.
    pub fn skip_break(&mut self, session: &mut SessionManager) -> Option<Event> {
        if self.phase != Phase::LongBreak {
            return None;
        }
        match session.skip_break() {
            Ok(brk) => {
                self.reset();
                Some(Event::BreakSkipped {
                    cycle_id: brk.cycle_id,
                    at: session.now(),
                })
            }
            Err(e) => {
                warn!(error = %e, "skip break rejected");
                None
            }
        }
    }

    /// Disarm both sources and return to idle from any phase.
    pub fn stop_timer(&mut self, session: &SessionManager) -> Option<Event> {
        if self.phase == Phase::Idle && !self.is_running && self.slots.armed().is_none() {
            return None;
        }
        let phase = self.phase;
        let elapsed_secs = self.elapsed_secs;
        self.reset();
        Some(Event::TimerStopped {
            phase,
            elapsed_secs,
            at: session.now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn main_tick(&mut self, session: &mut SessionManager) -> Option<Event> {
        self.elapsed_secs += 1;
        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        match self.phase {
            Phase::Focusing => {
                if self.elapsed_secs >= self.next_micro_break_at && cycle_is_active(session) {
                    return self.begin_micro_break(session);
                }
                if self.remaining_secs == 0 {
                    return self.complete_focus(session);
                }
                None
            }
            Phase::LongBreak if self.remaining_secs == 0 => self.complete_long_break(session),
            _ => None,
        }
    }

    fn micro_break_tick(&mut self, session: &mut SessionManager) -> Option<Event> {
        self.micro_break_countdown = self.micro_break_countdown.saturating_sub(1);
        if self.micro_break_countdown > 0 {
            return None;
        }

        let last = session.micro_breaks().last();
        let sequence = last.map(|m| m.sequence).unwrap_or(0);
        let interval = match last.map(|m| m.next_interval_secs) {
            Some(hint) => hint,
            None => session.next_micro_break_interval(),
        };
        self.phase = Phase::Focusing;
        self.next_micro_break_at = self.elapsed_secs + u64::from(interval);
        debug!(sequence, next_at = self.next_micro_break_at, "micro-break ended");

        if self.remaining_secs == 0 {
            return self.complete_focus(session);
        }
        self.slots.arm(TickSource::Main);
        Some(Event::MicroBreakEnded {
            sequence,
            next_micro_break_at: self.next_micro_break_at,
            at: session.now(),
        })
    }

    fn begin_micro_break(&mut self, session: &mut SessionManager) -> Option<Event> {
        let micro = match session.record_micro_break() {
            Ok(micro) => micro.clone(),
            Err(e) => {
                warn!(error = %e, "micro-break not recorded");
                self.schedule_next_micro_break(session);
                return None;
            }
        };

        self.phase = Phase::MicroBreak;
        self.micro_break_countdown = MICRO_BREAK_SECS;

        if session.should_notify() {
            if let Err(e) = self.notifier.send_micro_break() {
                warn!(error = %e, "micro-break notification failed");
            }
        }
        if let Err(e) = self.audio.play_micro_break(&session.settings().sound) {
            warn!(error = %e, "micro-break sound failed");
        }

        self.slots.arm(TickSource::MicroBreak);
        Some(Event::MicroBreakStarted {
            cycle_id: micro.cycle_id,
            sequence: micro.sequence,
            duration_secs: micro.duration_secs(),
            at: session.now(),
        })
    }

    fn complete_focus(&mut self, session: &mut SessionManager) -> Option<Event> {
        self.slots.disarm_all();
        let break_minutes = match session.complete_cycle_and_start_break() {
            Ok(brk) => brk.duration_minutes,
            Err(e) => {
                // Paused at zero: retry on the next tick.
                warn!(error = %e, "focus completion deferred");
                self.slots.arm(TickSource::Main);
                return None;
            }
        };

        if session.should_notify() {
            if let Err(e) = self.notifier.send_cycle_complete() {
                warn!(error = %e, "cycle-complete notification failed");
            }
        }
        let sound = &session.settings().sound;
        if let Err(e) = self.audio.play_cycle_complete(sound) {
            warn!(error = %e, "cycle-complete sound failed");
        }
        if let Err(e) = self.audio.play_long_break(sound) {
            warn!(error = %e, "long-break sound failed");
        }

        self.phase = Phase::LongBreak;
        self.elapsed_secs = 0;
        self.remaining_secs = u64::from(break_minutes) * 60;
        self.micro_break_countdown = 0;
        self.is_running = true;
        self.slots.arm(TickSource::Main);

        let cycle = session.current_cycle()?;
        Some(Event::CycleCompleted {
            cycle_id: cycle.id,
            actual_seconds: cycle.actual_seconds(),
            micro_breaks: cycle.micro_break_count(),
            break_minutes,
            at: session.now(),
        })
    }

    fn complete_long_break(&mut self, session: &mut SessionManager) -> Option<Event> {
        let result = session.complete_break();
        self.reset();
        let brk = match result {
            Ok(brk) => brk,
            Err(e) => {
                warn!(error = %e, "break completion rejected");
                return None;
            }
        };

        if session.should_notify() {
            if let Err(e) = self.notifier.send_break_complete() {
                warn!(error = %e, "break-complete notification failed");
            }
        }
        Some(Event::BreakCompleted {
            cycle_id: brk.cycle_id,
            at: session.now(),
        })
    }

    fn schedule_next_micro_break(&mut self, session: &mut SessionManager) {
        let interval = session.next_micro_break_interval();
        self.next_micro_break_at = self.elapsed_secs + u64::from(interval);
        debug!(interval, next_at = self.next_micro_break_at, "micro-break scheduled");
    }

    fn reset(&mut self) {
        self.slots.disarm_all();
        self.phase = Phase::Idle;
        self.is_running = false;
        self.elapsed_secs = 0;
        self.remaining_secs = 0;
        self.next_micro_break_at = 0;
        self.micro_break_countdown = 0;
    }
}

fn cycle_is_active(session: &SessionManager) -> bool {
    session
        .current_cycle()
        .map(|c| c.status() == CycleStatus::Active)
        .unwrap_or(false)
}

/// `mm:ss`, minutes not wrapped into hours.
fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
