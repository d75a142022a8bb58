mod engine;
mod schedule;
mod ticks;

pub use engine::{Phase, TimerEngine};
pub use schedule::IntervalSampler;
pub use ticks::{TickSlots, TickSource, TickToken};
