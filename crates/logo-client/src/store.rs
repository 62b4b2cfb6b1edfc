use std::sync::Arc;

use anyhow::Result;
use logo_types::Generation;
use tokio::sync::watch;

use crate::lifecycle::{CurrentGeneration, Transition};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogoState {
    pub current: CurrentGeneration,
    /// The last generation that finished successfully.
    pub latest_project: Option<Generation>,
}

/// Owns the session's generation state. Screens read it through
/// [`LogoStore::subscribe`] and change it only through [`LogoStore::dispatch`].
#[derive(Debug, Clone)]
pub struct LogoStore {
    state: Arc<watch::Sender<LogoState>>,
}

impl Default for LogoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogoStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LogoState::default());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LogoState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LogoState {
        self.state.borrow().clone()
    }

    pub fn current(&self) -> CurrentGeneration {
        self.state.borrow().current.clone()
    }

    /// Applies a transition to the current generation. Rejected transitions
    /// leave the state untouched and don't wake subscribers.
    pub fn dispatch(&self, transition: Transition) -> Result<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| match state.current.apply(transition) {
            Ok(next) => {
                state.current = next;
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }

    pub fn set_latest_project(&self, project: Option<Generation>) {
        self.state.send_modify(|state| state.latest_project = project);
    }

    /// Back to idle, as on app entry or "try again".
    pub fn reset(&self) -> Result<()> {
        self.dispatch(Transition::Reset)
    }
}
