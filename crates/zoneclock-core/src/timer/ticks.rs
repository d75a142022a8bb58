//! Tick slots with generation tokens.
//!
//! The engine has two logical tick sources but at most one is armed at a
//! time. Every arm hands out a fresh token; a token that is no longer the
//! armed one is stale and must be ignored by whoever fires it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickSource {
    /// Once-per-second countdown of the focus or long-break phase.
    Main,
    /// Countdown of a running micro-break.
    MicroBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickToken {
    pub source: TickSource,
    pub generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TickSlots {
    generation: u64,
    armed: Option<TickToken>,
}

impl TickSlots {
    /// Arm `source`, cancelling whatever token was armed before.
    pub fn arm(&mut self, source: TickSource) -> TickToken {
        self.generation += 1;
        let token = TickToken {
            source,
            generation: self.generation,
        };
        self.armed = Some(token);
        token
    }

    pub fn disarm_all(&mut self) {
        self.armed = None;
    }

    pub fn armed(&self) -> Option<TickToken> {
        self.armed
    }

    pub fn is_current(&self, token: TickToken) -> bool {
        self.armed == Some(token)
    }
}
