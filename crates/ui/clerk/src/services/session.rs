use std::sync::{Arc, PoisonError, RwLock};

use api::TrackerApi;
use api::types::LoginRequest;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::action::Action;

/// Authentication state for the running process. There is no persistence;
/// closing the client ends the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated {
        user_id: String,
        nickname: String,
    },
}

/// The single writer. `App` owns it; everything else sees a [`SessionSignal`].
/// Authentication flips only when a login completion is applied on the event
/// loop, logout only from the logout action.
#[derive(Debug, Default)]
pub struct SessionGate {
    state: Arc<RwLock<SessionState>>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> SessionSignal {
        SessionSignal {
            state: Arc::clone(&self.state),
        }
    }

    pub fn authenticate(&mut self, user_id: String, nickname: String) {
        debug!(user_id = %user_id, "session authenticated");
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            SessionState::Authenticated { user_id, nickname };
    }

    pub fn clear(&mut self) {
        debug!("session cleared");
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            SessionState::Unauthenticated;
    }
}

/// Read-only view of the session. Cheap to clone, safe to hand to any page.
#[derive(Debug, Clone)]
pub struct SessionSignal {
    state: Arc<RwLock<SessionState>>,
}

impl SessionSignal {
    pub fn is_authenticated(&self) -> bool {
        matches!(
            *self.state.read().unwrap_or_else(PoisonError::into_inner),
            SessionState::Authenticated { .. }
        )
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Run a login attempt off the loop. The outcome comes back as
/// [`Action::LoginFinished`]; a cancelled attempt sends nothing.
pub fn spawn_login(
    tracker: Arc<dyn TrackerApi>,
    tx: UnboundedSender<Action>,
    cancel: CancellationToken,
    request: LoginRequest,
) {
    let user_id = request.user_id.clone();
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(user_id = %user_id, "login attempt cancelled");
            }
            result = tracker.login(request) => {
                let outcome = result.map_err(|err| err.user_message());
                let _ = tx.send(Action::LoginFinished(outcome));
            }
        }
    });
}
