use std::sync::Mutex;
use tracing::warn;

/// The orchestrator's phase. One linear cycle:
/// `Idle -> Recording -> Processing -> DispatchingCommands -> Idle`,
/// with `AwaitingConversation` covering the bounded join on the reply
/// task at the tail of a cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Idle,
    Recording,
    Processing,
    DispatchingCommands,
    AwaitingConversation,
}

/// Monitor over the session phase. Transitions happen only through the
/// named methods below, replacing the ad hoc boolean flags the audio
/// callback and worker threads would otherwise share.
pub struct SessionCell {
    state: Mutex<SessionState>,
}

impl Default for SessionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Idle),
        }
    }

    pub fn current(&self) -> SessionState {
        self.state
            .lock()
            .map(|g| *g)
            .unwrap_or(SessionState::Idle)
    }

    /// Frames are only ingested while idle or recording; during the rest
    /// of a cycle they are dropped entirely so cycles never overlap.
    pub fn accepting_audio(&self) -> bool {
        matches!(
            self.current(),
            SessionState::Idle | SessionState::Recording
        )
    }

    pub fn begin_recording(&self) -> bool {
        self.transition(&[SessionState::Idle], SessionState::Recording)
    }

    /// Idempotent: the pump flips this synchronously at finalize time and
    /// the cycle task confirms it once scheduled.
    pub fn begin_processing(&self) -> bool {
        self.transition(
            &[
                SessionState::Idle,
                SessionState::Recording,
                SessionState::Processing,
            ],
            SessionState::Processing,
        )
    }

    pub fn begin_dispatch(&self) -> bool {
        self.transition(&[SessionState::Processing], SessionState::DispatchingCommands)
    }

    pub fn await_conversation(&self) -> bool {
        self.transition(
            &[
                SessionState::Processing,
                SessionState::DispatchingCommands,
            ],
            SessionState::AwaitingConversation,
        )
    }

    /// Always returns to `Idle`; the cycle is over whatever happened.
    pub fn complete_cycle(&self) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = SessionState::Idle;
        }
    }

    fn transition(&self, from: &[SessionState], to: SessionState) -> bool {
        let Ok(mut guard) = self.state.lock() else {
            warn!("session mutex poisoned");
            return false;
        };
        if from.contains(&*guard) {
            *guard = to;
            true
        } else {
            warn!(current = ?*guard, requested = ?to, "invalid session transition ignored");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_cycle_transitions() {
        let cell = SessionCell::new();
        assert_eq!(cell.current(), SessionState::Idle);
        assert!(cell.accepting_audio());

        assert!(cell.begin_recording());
        assert!(cell.accepting_audio());

        assert!(cell.begin_processing());
        assert!(!cell.accepting_audio());

        assert!(cell.begin_dispatch());
        assert!(cell.await_conversation());
        assert!(!cell.accepting_audio());

        cell.complete_cycle();
        assert_eq!(cell.current(), SessionState::Idle);
    }

    #[test]
    fn recording_cannot_restart_mid_cycle() {
        let cell = SessionCell::new();
        assert!(cell.begin_recording());
        assert!(cell.begin_processing());
        // The gate cannot open a second recording while processing.
        assert!(!cell.begin_recording());
        assert_eq!(cell.current(), SessionState::Processing);
    }

    #[test]
    fn begin_processing_is_idempotent() {
        let cell = SessionCell::new();
        assert!(cell.begin_recording());
        assert!(cell.begin_processing());
        assert!(cell.begin_processing());
        assert_eq!(cell.current(), SessionState::Processing);
    }

    #[test]
    fn dispatch_requires_processing() {
        let cell = SessionCell::new();
        assert!(!cell.begin_dispatch());
        assert_eq!(cell.current(), SessionState::Idle);
    }
}
