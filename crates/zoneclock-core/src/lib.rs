//! # Zoneclock Core Library
//!
//! Core logic for the Zoneclock focus timer: long focus cycles sprinkled
//! with short random micro-breaks, followed by a long break. Everything the
//! CLI does goes through this crate.
//!
//! ## Architecture
//!
//! - **Session Manager**: application state machine owning the current cycle,
//!   its micro-breaks and the long break
//! - **Timer Engine**: tick-driven phase machine; the caller fires one tick
//!   per second and lends it the session manager
//! - **Runtime**: tokio driver that owns both and ticks them under one lock
//! - **Storage**: SQLite or in-memory persistence of settings, flags and
//!   cycle records, plus TOML process configuration
//! - **Statistics**: daily, ranged and trend aggregation over cycle records
//!
//! ## Key Components
//!
//! - [`SessionManager`]: lifecycle operations and queries
//! - [`TimerEngine`]: focus, micro-break and long-break countdowns
//! - [`FocusRuntime`]: async ticker and event channel
//! - [`Storage`]: persistence port implemented by [`SqliteStore`] and [`MemoryStore`]

pub mod breaks;
pub mod clock;
pub mod cycle;
pub mod error;
pub mod events;
pub mod ports;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod timer;

pub use breaks::{LongBreak, LongBreakStatus, MicroBreak, MICRO_BREAK_SECS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cycle::{Cycle, CycleRecord, CycleStatus};
pub use error::{ConfigError, CoreError, PortError, StorageError, ValidationError};
pub use events::Event;
pub use ports::{AudioPlayer, LogAudio, LogNotifier, NoopAudio, NoopNotifier, Notifier};
pub use runtime::FocusRuntime;
pub use session::{AppState, SessionManager};
pub use settings::{MicroBreakInterval, Settings, SoundCue, SoundSettings};
pub use stats::{DailyStatistics, PeakHour, Trend, WeekdayFocus};
pub use storage::{Config, MemoryStore, SqliteStore, Storage};
pub use timer::{IntervalSampler, Phase, TickSource, TickToken, TimerEngine};
