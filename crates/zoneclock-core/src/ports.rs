//! Notification and audio collaborators of the timer engine.
//!
//! Both are injected at engine construction. Calls are best-effort: the
//! engine logs a failure and keeps advancing.

use tracing::info;

use crate::error::PortError;
use crate::settings::SoundSettings;
use crate::storage::{AudioBackend, NotifierBackend};

pub trait Notifier: Send {
    fn send_micro_break(&self) -> Result<(), PortError>;
    fn send_cycle_complete(&self) -> Result<(), PortError>;
    fn send_break_complete(&self) -> Result<(), PortError>;
}

pub trait AudioPlayer: Send {
    fn play_micro_break(&self, sound: &SoundSettings) -> Result<(), PortError>;
    fn play_long_break(&self, sound: &SoundSettings) -> Result<(), PortError>;
    fn play_cycle_complete(&self, sound: &SoundSettings) -> Result<(), PortError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send_micro_break(&self) -> Result<(), PortError> {
        Ok(())
    }
    fn send_cycle_complete(&self) -> Result<(), PortError> {
        Ok(())
    }
    fn send_break_complete(&self) -> Result<(), PortError> {
        Ok(())
    }
}

/// Writes notifications to the log under the `notify` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_micro_break(&self) -> Result<(), PortError> {
        info!(target: "notify", "Micro-break: relax for a few seconds");
        Ok(())
    }
    fn send_cycle_complete(&self) -> Result<(), PortError> {
        info!(target: "notify", "Focus cycle complete, time for a long break");
        Ok(())
    }
    fn send_break_complete(&self) -> Result<(), PortError> {
        info!(target: "notify", "Break over. Start a new cycle when ready");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAudio;

impl AudioPlayer for NoopAudio {
    fn play_micro_break(&self, _sound: &SoundSettings) -> Result<(), PortError> {
        Ok(())
    }
    fn play_long_break(&self, _sound: &SoundSettings) -> Result<(), PortError> {
        Ok(())
    }
    fn play_cycle_complete(&self, _sound: &SoundSettings) -> Result<(), PortError> {
        Ok(())
    }
}

/// Logs which cue would play. Long-break and completion use the bowl cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioPlayer for LogAudio {
    fn play_micro_break(&self, sound: &SoundSettings) -> Result<(), PortError> {
        info!(target: "audio", cue = sound.cue.as_str(), volume = sound.volume, "play");
        Ok(())
    }
    fn play_long_break(&self, sound: &SoundSettings) -> Result<(), PortError> {
        info!(target: "audio", cue = "bowl", volume = sound.volume, "play");
        Ok(())
    }
    fn play_cycle_complete(&self, sound: &SoundSettings) -> Result<(), PortError> {
        info!(target: "audio", cue = "bowl", volume = sound.volume, "play");
        Ok(())
    }
}

pub fn notifier_for(backend: NotifierBackend) -> Box<dyn Notifier> {
    match backend {
        NotifierBackend::Log => Box::new(LogNotifier),
        NotifierBackend::None => Box::new(NoopNotifier),
    }
}

pub fn audio_for(backend: AudioBackend) -> Box<dyn AudioPlayer> {
    match backend {
        AudioBackend::Log => Box::new(LogAudio),
        AudioBackend::None => Box::new(NoopAudio),
    }
}
