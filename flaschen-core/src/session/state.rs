//! Animation lifecycle state machine.
//!
//! Provides an `AnimationState` enum with validated transitions that
//! return `Result` instead of silently ignoring bad requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FlaschenError;

// ── AnimationState ───────────────────────────────────────────────

/// Whether, and how, the frame-generation loop runs.
///
/// ```text
///            start               pause
///  Stopped ─────────► Running ─────────► Paused
///     ▲  ▲              │  ▲               │
///     │  │     stop     │  └──── start ────┘
///     │  └──────────────┘
///     │
///   stop ── Blank ◄── blank (from any state)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationState {
    /// Frames are generated and sent.
    Running,
    /// The loop is frozen; the last frame stays on the display.
    Paused,
    /// No animation; the welcome text is shown. Initial state.
    #[default]
    Stopped,
    /// Both layers are cleared and nothing is drawn.
    Blank,
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
            Self::Stopped => write!(f, "Stopped"),
            Self::Blank => write!(f, "Blank"),
        }
    }
}

impl AnimationState {
    /// Whether the animation layer should advance this tick.
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the custom text overlay belongs on the display.
    pub fn shows_custom_text(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    fn invalid(&self, action: &'static str) -> FlaschenError {
        FlaschenError::InvalidTransition {
            from: self.to_string(),
            action,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Running`.
    ///
    /// Valid from: `Stopped`, `Paused`, `Blank`.
    pub fn start(&mut self) -> Result<(), FlaschenError> {
        match self {
            Self::Stopped | Self::Paused | Self::Blank => {
                *self = Self::Running;
                Ok(())
            }
            Self::Running => Err(self.invalid("start")),
        }
    }

    /// Transition to `Paused`.
    ///
    /// Valid from: `Running`.
    pub fn pause(&mut self) -> Result<(), FlaschenError> {
        match self {
            Self::Running => {
                *self = Self::Paused;
                Ok(())
            }
            _ => Err(self.invalid("pause")),
        }
    }

    /// Transition to `Stopped`. Valid from every state.
    pub fn stop(&mut self) {
        *self = Self::Stopped;
    }

    /// Transition to `Blank`. Valid from every state.
    pub fn blank(&mut self) {
        *self = Self::Blank;
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_stopped() {
        assert_eq!(AnimationState::default(), AnimationState::Stopped);
    }

    #[test]
    fn run_pause_resume_stop() {
        let mut state = AnimationState::default();
        state.start().unwrap();
        assert!(state.is_animating());

        state.pause().unwrap();
        assert_eq!(state, AnimationState::Paused);
        assert!(!state.is_animating());
        assert!(state.shows_custom_text());

        state.start().unwrap();
        assert_eq!(state, AnimationState::Running);

        state.stop();
        assert_eq!(state, AnimationState::Stopped);
        assert!(!state.shows_custom_text());
    }

    #[test]
    fn invalid_transitions() {
        let mut state = AnimationState::Stopped;
        let err = state.pause().unwrap_err();
        assert!(err.to_string().contains("pause"));
        assert!(err.to_string().contains("Stopped"));
        assert_eq!(state, AnimationState::Stopped);

        state.start().unwrap();
        assert!(state.start().is_err());
    }

    #[test]
    fn blank_from_anywhere_then_start() {
        let mut state = AnimationState::Paused;
        state.blank();
        assert_eq!(state.to_string(), "Blank");
        state.start().unwrap();
        assert_eq!(state, AnimationState::Running);
    }
}
