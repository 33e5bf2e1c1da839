//! Explicit session context for a display controller.
//!
//! A [`Session`] owns the animation state and the user settings. Every
//! change is published on a `tokio::sync::watch` channel so render loops
//! react to changes instead of polling for them.

pub mod control;
pub mod settings;
pub mod state;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::FlaschenError;

pub use control::ControlCommand;
pub use settings::{MAX_TEXT_LEN, Settings, SettingsStore};
pub use state::AnimationState;

// ── SessionSnapshot ──────────────────────────────────────────────

/// Everything a render loop needs to know, as of one moment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: AnimationState,
    pub settings: Settings,
}

// ── Session ──────────────────────────────────────────────────────

pub struct Session {
    snapshot: SessionSnapshot,
    store: Option<SettingsStore>,
    tx: watch::Sender<SessionSnapshot>,
}

impl Session {
    /// Start in `Stopped` with the given settings and no persistence.
    pub fn new(settings: Settings) -> Self {
        let snapshot = SessionSnapshot {
            state: AnimationState::default(),
            settings,
        };
        let (tx, _rx) = watch::channel(snapshot.clone());
        Self {
            snapshot,
            store: None,
            tx,
        }
    }

    /// Start in `Stopped` with settings read from `store`; later changes
    /// are written back to it.
    pub fn with_store(store: SettingsStore) -> Self {
        let mut session = Self::new(store.load());
        session.store = Some(store);
        session
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> AnimationState {
        self.snapshot.state
    }

    /// Apply one command and publish the resulting snapshot.
    ///
    /// Invalid transitions leave the session unchanged and are returned
    /// as errors. A failed settings write is logged; the change still
    /// takes effect in memory.
    pub fn apply(&mut self, command: ControlCommand) -> Result<SessionSnapshot, FlaschenError> {
        let state = &mut self.snapshot.state;
        let mut settings_changed = false;

        match command {
            ControlCommand::Start => state.start()?,
            ControlCommand::Pause => state.pause()?,
            ControlCommand::Stop => state.stop(),
            ControlCommand::Blank => state.blank(),
            ControlCommand::Color(color) => {
                self.snapshot.settings.color = color;
                settings_changed = true;
            }
            ControlCommand::Text(text) => {
                self.snapshot.settings.text = text.chars().take(MAX_TEXT_LEN).collect();
                settings_changed = true;
            }
            ControlCommand::Status => return Ok(self.snapshot.clone()),
        }

        if settings_changed {
            self.persist();
        }
        info!(
            "session: {} color={} text={:?}",
            self.snapshot.state, self.snapshot.settings.color, self.snapshot.settings.text
        );
        self.tx.send_replace(self.snapshot.clone());
        Ok(self.snapshot.clone())
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.snapshot.settings) {
                warn!("failed to save settings to {}: {e}", store.path().display());
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorSelection, Rgb};

    #[test]
    fn commands_drive_state() {
        let mut session = Session::new(Settings::default());
        assert_eq!(session.state(), AnimationState::Stopped);

        session.apply(ControlCommand::Start).unwrap();
        session.apply(ControlCommand::Pause).unwrap();
        assert_eq!(session.state(), AnimationState::Paused);

        assert!(session.apply(ControlCommand::Pause).is_err());
        assert_eq!(session.state(), AnimationState::Paused);
    }

    #[test]
    fn text_is_truncated() {
        let mut session = Session::new(Settings::default());
        let snap = session
            .apply(ControlCommand::Text("A".repeat(MAX_TEXT_LEN + 5)))
            .unwrap();
        assert_eq!(snap.settings.text.len(), MAX_TEXT_LEN);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let mut session = Session::new(Settings::default());
        let mut rx = session.subscribe();

        session
            .apply(ControlCommand::Color(ColorSelection::Fixed(Rgb::new(255, 255, 0))))
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().settings.color,
            ColorSelection::Fixed(Rgb::new(255, 255, 0))
        );

        session.apply(ControlCommand::Status).unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn changes_are_persisted() {
        let path = std::env::temp_dir().join(format!("flaschen-{}-session.json", std::process::id()));
        let store = SettingsStore::new(&path);
        {
            let mut session = Session::with_store(store.clone());
            session.apply(ControlCommand::Text("HELLO".into())).unwrap();
        }
        let reloaded = Session::with_store(store);
        assert_eq!(reloaded.snapshot().settings.text, "HELLO");
        std::fs::remove_file(path).unwrap();
    }
}
