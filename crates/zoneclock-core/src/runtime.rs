//! Async driver that ticks the engine once per second.
//!
//! [`FocusRuntime`] owns the session manager and the engine behind a single
//! async mutex, so lifecycle calls and ticks never interleave. Lock order is
//! always core, then ticker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cycle::CycleRecord;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::session::{AppState, SessionManager};
use crate::timer::{Phase, TimerEngine};

struct Core {
    session: SessionManager,
    engine: TimerEngine,
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

#[derive(Clone)]
pub struct FocusRuntime {
    core: Arc<Mutex<Core>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    events: mpsc::UnboundedSender<Event>,
    tick_interval: Duration,
}

impl FocusRuntime {
    /// Wrap a session and engine. Events are delivered on the returned receiver.
    pub fn new(
        session: SessionManager,
        engine: TimerEngine,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        let runtime = Self {
            core: Arc::new(Mutex::new(Core { session, engine })),
            ticker: Arc::new(Mutex::new(None)),
            events,
            tick_interval: Duration::from_secs(1),
        };
        (runtime, rx)
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Start a focus cycle and begin ticking.
    pub async fn start(&self, duration_override: Option<u32>) -> Result<()> {
        let mut core = self.core.lock().await;
        let Core { session, engine } = &mut *core;

        session.start_focus_cycle(duration_override)?;
        if let Some(event) = engine.start_focus_cycle(session) {
            self.emit(event);
        }
        self.spawn_ticker().await;
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        let mut core = self.core.lock().await;
        let Core { session, engine } = &mut *core;

        session.pause_cycle()?;
        self.cancel_ticker().await;
        if let Some(event) = engine.pause_timer(session) {
            self.emit(event);
        }
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        let mut core = self.core.lock().await;
        let Core { session, engine } = &mut *core;

        session.resume_cycle()?;
        if let Some(event) = engine.resume_timer(session) {
            self.emit(event);
        }
        self.spawn_ticker().await;
        Ok(())
    }

    /// Stop whatever is running and return to `Ready`.
    ///
    /// Stopping a focus cycle returns its record. Stopping during the long
    /// break skips it.
    pub async fn stop(&self) -> Result<Option<CycleRecord>> {
        let mut core = self.core.lock().await;
        let Core { session, engine } = &mut *core;

        let result = match session.state() {
            AppState::Focusing => session.stop_cycle().map(Some),
            AppState::Resting => session.skip_break().map(|_| None),
            state => {
                return Err(CoreError::InvalidState(format!(
                    "nothing to stop while {state}"
                )))
            }
        };

        // Cancel and disarm under the same lock so no tick lands in between.
        self.cancel_ticker().await;
        if let Some(event) = engine.stop_timer(session) {
            self.emit(event);
        }
        result
    }

    pub async fn skip_break(&self) -> Result<()> {
        let mut core = self.core.lock().await;
        let Core { session, engine } = &mut *core;

        let event = engine.skip_break(session).ok_or_else(|| {
            CoreError::InvalidState(format!("no long break to skip while {}", session.state()))
        })?;
        self.cancel_ticker().await;
        self.emit(event);
        Ok(())
    }

    pub async fn snapshot(&self) -> Event {
        let core = self.core.lock().await;
        core.engine.snapshot(&core.session)
    }

    pub async fn phase(&self) -> Phase {
        self.core.lock().await.engine.phase()
    }

    /// Run `f` against the session, e.g. to change settings or DND.
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut SessionManager) -> R) -> R {
        let mut core = self.core.lock().await;
        f(&mut core.session)
    }

    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
        info!("focus runtime shut down");
    }

    fn emit(&self, event: Event) {
        // A dropped receiver just means nobody is listening.
        let _ = self.events.send(event);
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(previous) = ticker_guard.take() {
            previous.cancel.cancel();
            previous.handle.abort();
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let core = self.core.clone();
        let events = self.events.clone();
        let period = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut core = core.lock().await;
                        if token.is_cancelled() {
                            break;
                        }
                        let Core { session, engine } = &mut *core;
                        let Some(armed) = engine.armed() else {
                            break;
                        };
                        if let Some(event) = engine.fire(armed, session) {
                            let _ = events.send(event);
                        }
                        if engine.phase() == Phase::Idle {
                            break;
                        }
                    }
                }
            }
            debug!("ticker exited");
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }
    }
}
