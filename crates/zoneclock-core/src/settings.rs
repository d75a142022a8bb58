//! User settings for focus cycles and breaks.
//!
//! Settings are validated as a whole: [`Settings::validate`] reports every
//! violated rule at once, and the session manager refuses to apply or
//! persist a value that fails it.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const FOCUS_MINUTES_MIN: u32 = 15;
pub const FOCUS_MINUTES_MAX: u32 = 180;
pub const BREAK_MINUTES_MIN: u32 = 5;
pub const BREAK_MINUTES_MAX: u32 = 60;
pub const MICRO_INTERVAL_FLOOR_SECS: u32 = 120;
pub const MICRO_INTERVAL_CEIL_SECS: u32 = 300;

/// Sound cue played when a micro-break starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    #[default]
    Bell,
    Woodfish,
    Waterdrop,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Bell => "bell",
            SoundCue::Woodfish => "woodfish",
            SoundCue::Waterdrop => "waterdrop",
        }
    }
}

/// Audio preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    #[serde(default)]
    pub cue: SoundCue,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_true")]
    pub vibration: bool,
}

/// Bounds for the randomized gap between micro-breaks, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroBreakInterval {
    #[serde(default = "default_interval_min")]
    pub min: u32,
    #[serde(default = "default_interval_max")]
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Focus cycle length in minutes.
    #[serde(default = "default_focus_duration")]
    pub focus_duration: u32,
    /// Long break length in minutes.
    #[serde(default = "default_break_duration")]
    pub break_duration: u32,
    #[serde(default)]
    pub micro_break_interval: MicroBreakInterval,
    #[serde(default)]
    pub sound: SoundSettings,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_focus_duration() -> u32 {
    90
}
fn default_break_duration() -> u32 {
    20
}
fn default_interval_min() -> u32 {
    MICRO_INTERVAL_FLOOR_SECS
}
fn default_interval_max() -> u32 {
    MICRO_INTERVAL_CEIL_SECS
}
fn default_volume() -> f32 {
    0.7
}
fn default_true() -> bool {
    true
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            cue: SoundCue::default(),
            volume: default_volume(),
            vibration: true,
        }
    }
}

impl Default for MicroBreakInterval {
    fn default() -> Self {
        Self {
            min: default_interval_min(),
            max: default_interval_max(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: default_focus_duration(),
            break_duration: default_break_duration(),
            micro_break_interval: MicroBreakInterval::default(),
            sound: SoundSettings::default(),
            notifications_enabled: true,
        }
    }
}

/// Whether `minutes` is an acceptable focus cycle length.
pub fn focus_duration_in_range(minutes: u32) -> bool {
    (FOCUS_MINUTES_MIN..=FOCUS_MINUTES_MAX).contains(&minutes)
}

impl Settings {
    /// Check every rule and collect all violations.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if !focus_duration_in_range(self.focus_duration) {
            errors.push(format!(
                "focus duration must be between {FOCUS_MINUTES_MIN} and {FOCUS_MINUTES_MAX} minutes (got {})",
                self.focus_duration
            ));
        }

        if !(BREAK_MINUTES_MIN..=BREAK_MINUTES_MAX).contains(&self.break_duration) {
            errors.push(format!(
                "break duration must be between {BREAK_MINUTES_MIN} and {BREAK_MINUTES_MAX} minutes (got {})",
                self.break_duration
            ));
        }

        let interval = self.micro_break_interval;
        if interval.min < MICRO_INTERVAL_FLOOR_SECS
            || interval.max > MICRO_INTERVAL_CEIL_SECS
            || interval.min > interval.max
        {
            errors.push(format!(
                "micro-break interval must satisfy {MICRO_INTERVAL_FLOOR_SECS} <= min <= max <= {MICRO_INTERVAL_CEIL_SECS} seconds (got {}..{})",
                interval.min, interval.max
            ));
        }

        if !(0.0..=1.0).contains(&self.sound.volume) {
            errors.push(format!(
                "volume must be between 0 and 1 (got {})",
                self.sound.volume
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
