//! Session manager: application state, the current cycle and its breaks.
//!
//! ## State Transitions
//!
//! ```text
//! Uninitialized -> Ready      complete_onboarding
//! Ready         -> Focusing   start_focus_cycle
//! Focusing      -> Resting    complete_cycle_and_start_break
//! Focusing      -> Ready      stop_cycle
//! Resting       -> Ready      complete_break | skip_break
//! ```
//!
//! Any other request is rejected with [`CoreError::InvalidState`] and leaves
//! the state untouched. Only one cycle exists at a time, and a new one is
//! only ever started by an explicit call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::breaks::{LongBreak, MicroBreak};
use crate::clock::Clock;
use crate::cycle::{Cycle, CycleRecord, CycleStatus};
use crate::error::{CoreError, Result, ValidationError};
use crate::settings::{
    focus_duration_in_range, Settings, FOCUS_MINUTES_MAX, FOCUS_MINUTES_MIN,
};
use crate::storage::{keys, Storage};
use crate::timer::IntervalSampler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    Uninitialized,
    Ready,
    Focusing,
    Resting,
}

impl AppState {
    pub fn can_transition_to(self, to: AppState) -> bool {
        use AppState::*;
        matches!(
            (self, to),
            (Uninitialized, Ready)
                | (Ready, Focusing)
                | (Focusing, Resting)
                | (Focusing, Ready)
                | (Resting, Ready)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::Uninitialized => "uninitialized",
            AppState::Ready => "ready",
            AppState::Focusing => "focusing",
            AppState::Resting => "resting",
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct SessionManager {
    state: AppState,
    settings: Settings,
    current_cycle: Option<Cycle>,
    current_break: Option<LongBreak>,
    micro_breaks: Vec<MicroBreak>,
    do_not_disturb: bool,
    sampler: IntervalSampler,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Load settings and flags from `storage`. Starts in `Ready` when
    /// onboarding was completed earlier, otherwise in `Uninitialized`.
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        let settings = storage.load_settings();
        let do_not_disturb = storage.flag(keys::DND_ENABLED);
        let state = if storage.flag(keys::ONBOARDING_COMPLETED) {
            AppState::Ready
        } else {
            AppState::Uninitialized
        };
        info!(%state, do_not_disturb, "session loaded");

        Self {
            state,
            settings,
            current_cycle: None,
            current_break: None,
            micro_breaks: Vec::new(),
            do_not_disturb,
            sampler: IntervalSampler::default(),
            storage,
            clock,
        }
    }

    /// Replace the interval sampler, e.g. with a seeded one.
    pub fn with_sampler(mut self, sampler: IntervalSampler) -> Self {
        self.sampler = sampler;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_cycle(&self) -> Option<&Cycle> {
        self.current_cycle.as_ref()
    }

    pub fn current_break(&self) -> Option<&LongBreak> {
        self.current_break.as_ref()
    }

    pub fn micro_breaks(&self) -> &[MicroBreak] {
        &self.micro_breaks
    }

    pub fn is_do_not_disturb(&self) -> bool {
        self.do_not_disturb
    }

    /// Notifications go out only with DND off and notifications enabled.
    pub fn should_notify(&self) -> bool {
        !self.do_not_disturb && self.settings.notifications_enabled
    }

    pub fn has_active_cycle(&self) -> bool {
        self.state == AppState::Focusing && self.current_cycle.is_some()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Progress of the long break while resting, else of the cycle, else 0.
    pub fn current_progress(&self) -> f64 {
        let now = self.now();
        match (self.state, &self.current_cycle, &self.current_break) {
            (AppState::Resting, _, Some(brk)) => brk.progress(now),
            (_, Some(cycle), _) => cycle.progress(now),
            _ => 0.0,
        }
    }

    /// Seconds left in the long break while resting, else in the cycle.
    pub fn remaining_seconds(&self) -> i64 {
        let now = self.now();
        match (self.state, &self.current_cycle, &self.current_break) {
            (AppState::Resting, _, Some(brk)) => brk.remaining_seconds(now),
            (_, Some(cycle), _) => cycle.remaining_seconds(now),
            _ => 0,
        }
    }

    /// Draw the gap to the next micro-break from the configured range.
    pub fn next_micro_break_interval(&mut self) -> u32 {
        self.sampler.next(&self.settings.micro_break_interval)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn complete_onboarding(&mut self) -> Result<()> {
        self.require(AppState::Uninitialized, "complete onboarding")?;
        self.storage.set_flag(keys::ONBOARDING_COMPLETED, true)?;
        self.transition(AppState::Ready)
    }

    /// Start a focus cycle of `duration_override` minutes, or the configured
    /// focus duration.
    pub fn start_focus_cycle(&mut self, duration_override: Option<u32>) -> Result<&Cycle> {
        self.require(AppState::Ready, "start focus cycle")?;

        let minutes = match duration_override {
            Some(m) if !focus_duration_in_range(m) => {
                return Err(ValidationError::single(format!(
                    "focus duration must be between {FOCUS_MINUTES_MIN} and {FOCUS_MINUTES_MAX} minutes (got {m})"
                ))
                .into());
            }
            Some(m) => m,
            None => self.settings.focus_duration,
        };

        let cycle = Cycle::new(minutes, self.now());
        if let Err(e) = self.storage.set_current_cycle_hint(&cycle.id.to_string()) {
            warn!(error = %e, "failed to write current cycle hint");
        }
        info!(cycle_id = %cycle.id, minutes, "focus cycle started");

        self.micro_breaks.clear();
        self.current_break = None;
        self.transition(AppState::Focusing)?;
        Ok(&*self.current_cycle.insert(cycle))
    }

    pub fn pause_cycle(&mut self) -> Result<()> {
        self.require(AppState::Focusing, "pause cycle")?;
        let now = self.now();
        let cycle = self.cycle_mut()?;
        if !cycle.pause(now) {
            return Err(CoreError::InvalidState(format!(
                "cannot pause a {:?} cycle",
                cycle.status()
            )));
        }
        info!(cycle_id = %cycle.id, "cycle paused");
        Ok(())
    }

    pub fn resume_cycle(&mut self) -> Result<()> {
        self.require(AppState::Focusing, "resume cycle")?;
        let now = self.now();
        let cycle = self.cycle_mut()?;
        if !cycle.resume(now) {
            return Err(CoreError::InvalidState(format!(
                "cannot resume a {:?} cycle",
                cycle.status()
            )));
        }
        info!(cycle_id = %cycle.id, paused_seconds = cycle.paused_seconds(), "cycle resumed");
        Ok(())
    }

    /// Stop the cycle early and return its record.
    ///
    /// The session is back in `Ready` even when persisting the record fails;
    /// that failure is still returned as [`CoreError::Storage`].
    pub fn stop_cycle(&mut self) -> Result<CycleRecord> {
        self.require(AppState::Focusing, "stop cycle")?;
        let now = self.now();
        let mut cycle = self
            .current_cycle
            .take()
            .ok_or_else(|| CoreError::NotFound("no current cycle".into()))?;
        cycle.stop(now);
        let record = CycleRecord::from_cycle(&cycle)
            .ok_or_else(|| CoreError::InvalidState("stopped cycle has no end time".into()))?;

        self.micro_breaks.clear();
        if let Err(e) = self.storage.clear_current_cycle_hint() {
            warn!(error = %e, "failed to clear current cycle hint");
        }
        self.transition(AppState::Ready)?;
        info!(
            cycle_id = %record.cycle_id,
            actual_seconds = record.actual_seconds,
            "cycle stopped"
        );

        self.storage.save_cycle_record(&record)?;
        Ok(record)
    }

    /// Complete the running cycle and start the long break.
    pub fn complete_cycle_and_start_break(&mut self) -> Result<&LongBreak> {
        self.require(AppState::Focusing, "complete cycle")?;
        let now = self.now();
        let break_minutes = self.settings.break_duration;

        let cycle = self.cycle_mut()?;
        if !cycle.complete(now) {
            return Err(CoreError::InvalidState(format!(
                "cannot complete a {:?} cycle",
                cycle.status()
            )));
        }
        let cycle_id = cycle.id;

        match self.current_cycle.as_ref().and_then(CycleRecord::from_cycle) {
            Some(record) => match self.storage.save_cycle_record(&record) {
                Ok(()) => info!(
                    cycle_id = %cycle_id,
                    actual_seconds = record.actual_seconds,
                    micro_breaks = record.micro_breaks,
                    "cycle completed"
                ),
                Err(e) => warn!(cycle_id = %cycle_id, error = %e, "failed to save cycle record"),
            },
            None => warn!(cycle_id = %cycle_id, "completed cycle produced no record"),
        }

        self.transition(AppState::Resting)?;
        info!(cycle_id = %cycle_id, minutes = break_minutes, "long break started");
        Ok(&*self
            .current_break
            .insert(LongBreak::new(cycle_id, break_minutes, now)))
    }

    /// Record a micro-break on the active cycle.
    pub fn record_micro_break(&mut self) -> Result<&MicroBreak> {
        self.require(AppState::Focusing, "record micro-break")?;
        match self.current_cycle.as_ref().map(Cycle::status) {
            None => return Err(CoreError::NotFound("no current cycle".into())),
            Some(CycleStatus::Active) => {}
            Some(status) => {
                return Err(CoreError::InvalidState(format!(
                    "micro-break needs an active cycle, not {status:?}"
                )))
            }
        }

        let next_interval = self.next_micro_break_interval();
        let now = self.now();
        let cycle = self.cycle_mut()?;
        cycle.record_micro_break();
        let micro = MicroBreak::new(cycle.id, cycle.micro_break_count(), next_interval, now);
        info!(cycle_id = %micro.cycle_id, sequence = micro.sequence, "micro-break");

        self.micro_breaks.push(micro);
        self.micro_breaks
            .last()
            .ok_or_else(|| CoreError::NotFound("micro-break".into()))
    }

    pub fn complete_break(&mut self) -> Result<LongBreak> {
        self.finish_break(true)
    }

    pub fn skip_break(&mut self) -> Result<LongBreak> {
        self.finish_break(false)
    }

    // ── Preferences ──────────────────────────────────────────────────

    /// Validate and apply new settings. Nothing changes when any rule fails.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        if let Err(e) = self.storage.save_settings(&self.settings) {
            warn!(error = %e, "failed to persist settings");
        }
        if let Err(e) = self
            .storage
            .set_flag(keys::NOTIFICATION_ENABLED, self.settings.notifications_enabled)
        {
            warn!(error = %e, "failed to persist notification flag");
        }
        info!("settings updated");
        Ok(())
    }

    pub fn toggle_do_not_disturb(&mut self, enabled: bool) {
        self.do_not_disturb = enabled;
        if let Err(e) = self.storage.set_flag(keys::DND_ENABLED, enabled) {
            warn!(error = %e, "failed to persist do-not-disturb flag");
        }
        info!(enabled, "do not disturb");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, expected: AppState, action: &str) -> Result<()> {
        if self.state == expected {
            return Ok(());
        }
        warn!(state = %self.state, expected = %expected, action, "rejected");
        Err(CoreError::InvalidState(format!(
            "cannot {action} while {}",
            self.state
        )))
    }

    fn transition(&mut self, to: AppState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            warn!(from = %self.state, to = %to, "rejected state transition");
            return Err(CoreError::InvalidState(format!(
                "{} -> {to} is not allowed",
                self.state
            )));
        }
        info!(from = %self.state, to = %to, "state transition");
        self.state = to;
        Ok(())
    }

    fn cycle_mut(&mut self) -> Result<&mut Cycle> {
        self.current_cycle
            .as_mut()
            .ok_or_else(|| CoreError::NotFound("no current cycle".into()))
    }

    fn finish_break(&mut self, completed: bool) -> Result<LongBreak> {
        let action = if completed { "complete break" } else { "skip break" };
        self.require(AppState::Resting, action)?;
        let now = self.now();
        let mut brk = self
            .current_break
            .take()
            .ok_or_else(|| CoreError::NotFound("no current break".into()))?;
        if completed {
            brk.complete(now);
        } else {
            brk.skip(now);
        }

        self.current_cycle = None;
        self.micro_breaks.clear();
        if let Err(e) = self.storage.clear_current_cycle_hint() {
            warn!(error = %e, "failed to clear current cycle hint");
        }
        self.transition(AppState::Ready)?;
        info!(cycle_id = %brk.cycle_id, status = ?brk.status(), "long break finished");
        Ok(brk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaks::LongBreakStatus;
    use crate::clock::ManualClock;
    use crate::settings::MicroBreakInterval;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ready_session() -> (SessionManager, Arc<MemoryStore>, ManualClock) {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(t0());
        let mut session = SessionManager::new(store.clone(), Arc::new(clock.clone()))
            .with_sampler(IntervalSampler::new(Some(3)));
        session.complete_onboarding().unwrap();
        (session, store, clock)
    }

    #[test]
    fn starts_uninitialized_until_onboarded() {
        let store = Arc::new(MemoryStore::new());
        let mut session = SessionManager::new(store.clone(), Arc::new(ManualClock::new(t0())));
        assert_eq!(session.state(), AppState::Uninitialized);
        assert!(matches!(
            session.start_focus_cycle(None),
            Err(CoreError::InvalidState(_))
        ));

        session.complete_onboarding().unwrap();
        assert_eq!(session.state(), AppState::Ready);
        assert!(session.complete_onboarding().is_err());

        // the flag survives a restart
        let again = SessionManager::new(store, Arc::new(ManualClock::new(t0())));
        assert_eq!(again.state(), AppState::Ready);
    }

    #[test]
    fn start_uses_settings_or_override() {
        let (mut session, store, _clock) = ready_session();
        let cycle = session.start_focus_cycle(None).unwrap();
        assert_eq!(cycle.planned_minutes, 90);
        let id = cycle.id.to_string();
        assert_eq!(session.state(), AppState::Focusing);
        assert_eq!(store.current_cycle_hint(), Some(id));
        session.stop_cycle().unwrap();

        let cycle = session.start_focus_cycle(Some(25)).unwrap();
        assert_eq!(cycle.planned_minutes, 25);
    }

    #[test]
    fn start_rejects_out_of_range_override() {
        let (mut session, _store, _clock) = ready_session();
        assert!(matches!(
            session.start_focus_cycle(Some(10)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            session.start_focus_cycle(Some(181)),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(session.state(), AppState::Ready);
        assert!(session.current_cycle().is_none());
    }

    #[test]
    fn second_start_is_rejected() {
        let (mut session, _store, _clock) = ready_session();
        let first = session.start_focus_cycle(None).unwrap().id;
        assert!(matches!(
            session.start_focus_cycle(None),
            Err(CoreError::InvalidState(_))
        ));
        assert_eq!(session.current_cycle().unwrap().id, first);
    }

    #[test]
    fn pause_twice_fails_and_does_not_double_count() {
        let (mut session, _store, clock) = ready_session();
        session.start_focus_cycle(Some(25)).unwrap();
        clock.advance_secs(30);
        session.pause_cycle().unwrap();
        clock.advance_secs(5);
        assert!(session.pause_cycle().is_err());
        clock.advance_secs(5);
        session.resume_cycle().unwrap();
        assert!(session.resume_cycle().is_err());
        assert_eq!(session.current_cycle().unwrap().paused_seconds(), 10);
    }

    #[test]
    fn stop_persists_exact_actual_duration() {
        let (mut session, store, clock) = ready_session();
        session.start_focus_cycle(Some(25)).unwrap();
        clock.advance_secs(120);
        session.pause_cycle().unwrap();
        clock.advance_secs(60);
        session.resume_cycle().unwrap();
        clock.advance_secs(30);

        let record = session.stop_cycle().unwrap();
        assert_eq!(record.actual_seconds, 150);
        assert_eq!(record.paused_seconds, 60);
        assert!(!record.was_completed);
        assert_eq!(session.state(), AppState::Ready);
        assert!(session.current_cycle().is_none());
        assert!(store.current_cycle_hint().is_none());
        assert_eq!(store.load_all_cycle_records().unwrap(), vec![record]);
    }

    #[test]
    fn complete_starts_break_and_break_returns_to_ready() {
        let (mut session, store, clock) = ready_session();
        session.start_focus_cycle(Some(25)).unwrap();
        clock.advance_secs(1500);

        let brk = session.complete_cycle_and_start_break().unwrap();
        assert_eq!(brk.duration_minutes, 20);
        assert_eq!(session.state(), AppState::Resting);
        let records = store.load_all_cycle_records().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].was_completed);
        assert_eq!(records[0].actual_seconds, 1500);

        let done = session.complete_break().unwrap();
        assert_eq!(done.status(), LongBreakStatus::Completed);
        assert_eq!(session.state(), AppState::Ready);
        assert!(session.current_cycle().is_none());
        assert!(session.current_break().is_none());
        // no auto-start
        assert!(!session.has_active_cycle());
    }

    #[test]
    fn skip_break_marks_skipped() {
        let (mut session, _store, clock) = ready_session();
        session.start_focus_cycle(Some(15)).unwrap();
        clock.advance_secs(900);
        session.complete_cycle_and_start_break().unwrap();
        let skipped = session.skip_break().unwrap();
        assert_eq!(skipped.status(), LongBreakStatus::Skipped);
        assert!(session.skip_break().is_err());
    }

    #[test]
    fn complete_rejects_paused_cycle() {
        let (mut session, store, _clock) = ready_session();
        session.start_focus_cycle(Some(25)).unwrap();
        session.pause_cycle().unwrap();
        assert!(session.complete_cycle_and_start_break().is_err());
        assert_eq!(session.state(), AppState::Focusing);
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn micro_breaks_need_active_cycle() {
        let (mut session, _store, _clock) = ready_session();
        assert!(session.record_micro_break().is_err());

        session.start_focus_cycle(Some(25)).unwrap();
        let first = session.record_micro_break().unwrap().clone();
        assert_eq!(first.sequence, 1);
        assert!((120..300).contains(&first.next_interval_secs));
        assert_eq!(session.record_micro_break().unwrap().sequence, 2);
        assert_eq!(session.current_cycle().unwrap().micro_break_count(), 2);

        session.pause_cycle().unwrap();
        assert!(session.record_micro_break().is_err());
        assert_eq!(session.micro_breaks().len(), 2);
    }

    #[test]
    fn invalid_settings_are_not_applied() {
        let (mut session, store, _clock) = ready_session();
        let mut bad = Settings::default();
        bad.focus_duration = 5;
        bad.break_duration = 90;
        match session.update_settings(bad) {
            Err(CoreError::Validation(e)) => assert_eq!(e.errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(session.settings(), &Settings::default());
        assert_eq!(store.load_settings(), Settings::default());
    }

    #[test]
    fn settings_survive_restart() {
        let (mut session, store, _clock) = ready_session();
        let mut settings = Settings::default();
        settings.focus_duration = 45;
        settings.micro_break_interval = MicroBreakInterval { min: 150, max: 200 };
        settings.notifications_enabled = false;
        session.update_settings(settings.clone()).unwrap();
        assert!(!store.flag(keys::NOTIFICATION_ENABLED));

        let reloaded = SessionManager::new(store, Arc::new(ManualClock::new(t0())));
        assert_eq!(reloaded.settings(), &settings);
    }

    #[test]
    fn do_not_disturb_is_persisted() {
        let (mut session, store, _clock) = ready_session();
        assert!(session.should_notify());
        session.toggle_do_not_disturb(true);
        assert!(session.is_do_not_disturb());
        assert!(!session.should_notify());
        assert!(store.flag(keys::DND_ENABLED));

        let reloaded = SessionManager::new(store, Arc::new(ManualClock::new(t0())));
        assert!(reloaded.is_do_not_disturb());
    }

    #[test]
    fn progress_follows_cycle_then_break() {
        let (mut session, _store, clock) = ready_session();
        assert_eq!(session.current_progress(), 0.0);
        session.start_focus_cycle(Some(20)).unwrap();
        clock.advance_secs(600);
        assert!((session.current_progress() - 0.5).abs() < 1e-9);
        assert_eq!(session.remaining_seconds(), 600);

        clock.advance_secs(600);
        session.complete_cycle_and_start_break().unwrap();
        clock.advance_secs(60);
        // the finished cycle is still held, but the break is what counts
        assert_eq!(session.remaining_seconds(), 20 * 60 - 60);
        assert!((session.current_progress() - 0.05).abs() < 1e-9);

        session.complete_break().unwrap();
        assert_eq!(session.remaining_seconds(), 0);
        assert_eq!(session.current_progress(), 0.0);
    }

    /// Delegates to a [`MemoryStore`] but can be told to fail record or
    /// key-value writes.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_records: AtomicBool,
        fail_kv_writes: AtomicBool,
    }

    impl Storage for FlakyStore {
        fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.kv_get(key)
        }
        fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_kv_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Poisoned);
            }
            self.inner.kv_set(key, value)
        }
        fn kv_remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.kv_remove(key)
        }
        fn save_cycle_record(&self, record: &CycleRecord) -> Result<(), StorageError> {
            if self.fail_records.load(Ordering::SeqCst) {
                return Err(StorageError::Poisoned);
            }
            self.inner.save_cycle_record(record)
        }
        fn load_all_cycle_records(&self) -> Result<Vec<CycleRecord>, StorageError> {
            self.inner.load_all_cycle_records()
        }
    }

    fn flaky_session() -> (SessionManager, Arc<FlakyStore>, ManualClock) {
        let store = Arc::new(FlakyStore::default());
        let clock = ManualClock::new(t0());
        let mut session = SessionManager::new(store.clone(), Arc::new(clock.clone()))
            .with_sampler(IntervalSampler::new(Some(3)));
        session.complete_onboarding().unwrap();
        (session, store, clock)
    }

    #[test]
    fn stop_returns_save_failure_but_still_reaches_ready() {
        let (mut session, store, clock) = flaky_session();
        session.start_focus_cycle(Some(25)).unwrap();
        clock.advance_secs(300);
        store.fail_records.store(true, Ordering::SeqCst);

        let err = session.stop_cycle().unwrap_err();
        assert!(matches!(err, CoreError::Storage(StorageError::Poisoned)));
        assert_eq!(session.state(), AppState::Ready);
        assert!(session.current_cycle().is_none());
        assert!(store.load_all_cycle_records().unwrap().is_empty());

        // the session is usable again
        store.fail_records.store(false, Ordering::SeqCst);
        session.start_focus_cycle(None).unwrap();
    }

    #[test]
    fn complete_starts_break_even_when_record_save_fails() {
        let (mut session, store, clock) = flaky_session();
        session.start_focus_cycle(Some(25)).unwrap();
        clock.advance_secs(1500);
        store.fail_records.store(true, Ordering::SeqCst);

        let brk = session.complete_cycle_and_start_break().unwrap();
        assert_eq!(brk.status(), LongBreakStatus::Active);
        assert_eq!(session.state(), AppState::Resting);
        assert!(store.load_all_cycle_records().unwrap().is_empty());
    }

    #[test]
    fn settings_apply_in_memory_when_save_fails() {
        let (mut session, store, _clock) = flaky_session();
        store.fail_kv_writes.store(true, Ordering::SeqCst);

        let mut settings = Settings::default();
        settings.focus_duration = 45;
        session.update_settings(settings).unwrap();
        assert_eq!(session.settings().focus_duration, 45);
        assert_eq!(store.load_settings().focus_duration, 90);

        session.toggle_do_not_disturb(true);
        assert!(session.is_do_not_disturb());
        assert!(!store.flag(keys::DND_ENABLED));
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Onboard,
        Start,
        Pause,
        Resume,
        Stop,
        Complete,
        MicroBreak,
        CompleteBreak,
        SkipBreak,
        Advance(i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Onboard),
            Just(Op::Start),
            Just(Op::Pause),
            Just(Op::Resume),
            Just(Op::Stop),
            Just(Op::Complete),
            Just(Op::MicroBreak),
            Just(Op::CompleteBreak),
            Just(Op::SkipBreak),
            (1i64..600).prop_map(Op::Advance),
        ]
    }

    proptest! {
        #[test]
        fn state_only_moves_along_table(ops in prop::collection::vec(op(), 1..60)) {
            let store = Arc::new(MemoryStore::new());
            let clock = ManualClock::new(t0());
            let mut session = SessionManager::new(store.clone(), Arc::new(clock.clone()))
                .with_sampler(IntervalSampler::new(Some(11)));
            let mut terminal_cycles = 0usize;

            for op in ops {
                let before = session.state();
                let ok = match op {
                    Op::Onboard => session.complete_onboarding().is_ok(),
                    Op::Start => session.start_focus_cycle(None).is_ok(),
                    Op::Pause => session.pause_cycle().is_ok(),
                    Op::Resume => session.resume_cycle().is_ok(),
                    Op::Stop => session.stop_cycle().is_ok(),
                    Op::Complete => session.complete_cycle_and_start_break().is_ok(),
                    Op::MicroBreak => session.record_micro_break().is_ok(),
                    Op::CompleteBreak => session.complete_break().is_ok(),
                    Op::SkipBreak => session.skip_break().is_ok(),
                    Op::Advance(secs) => { clock.advance_secs(secs); true }
                };
                let after = session.state();

                if after != before {
                    prop_assert!(ok);
                    prop_assert!(before.can_transition_to(after));
                }
                if ok && matches!(op, Op::Stop | Op::Complete) {
                    terminal_cycles += 1;
                }

                // at most one live cycle, present exactly while focusing or resting
                match after {
                    AppState::Focusing => {
                        let cycle = session.current_cycle();
                        prop_assert!(cycle.is_some());
                        prop_assert!(!cycle.map(|c| c.status().is_terminal()).unwrap_or(true));
                        prop_assert!(session.current_break().is_none());
                    }
                    AppState::Resting => prop_assert!(session.current_break().is_some()),
                    _ => {
                        prop_assert!(session.current_cycle().is_none());
                        prop_assert!(session.current_break().is_none());
                    }
                }
                prop_assert_eq!(store.record_count(), terminal_cycles);
            }
        }
    }
}
