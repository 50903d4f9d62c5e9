use std::sync::Arc;

use api::TrackerApi;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::action::{Action, CheckOutcome};
use crate::validate;

/// Verdict bookkeeping for the registration Id field, kept apart from the
/// spawning side so it stays a plain value.
///
/// The trustworthy verdict is always derived: [`VerdictState::verdict_for`]
/// answers only for the exact text it was checked against. Editing the field
/// "invalidates" the verdict without any bookkeeping here, and editing back
/// to the checked value restores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerdictState {
    checked_value: Option<String>,
    unique: Option<bool>,
    pending: Option<String>,
    failure: Option<String>,
}

impl VerdictState {
    /// The uniqueness verdict for `current_text`, or `None` when no verdict
    /// exists for exactly that text.
    pub fn verdict_for(&self, current_text: &str) -> Option<bool> {
        if self.checked_value.as_deref() == Some(current_text) {
            self.unique
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn begin(&mut self, candidate: String) {
        self.pending = Some(candidate);
        self.failure = None;
    }

    /// Land a resolved probe. The outcome only applies when its candidate
    /// still equals the field text at application time; anything else is
    /// discarded and the verdict for the current text stays unknown.
    /// Returns whether it applied.
    pub fn apply(&mut self, candidate: &str, outcome: &CheckOutcome, current_text: &str) -> bool {
        if self.pending.as_deref() == Some(candidate) {
            self.pending = None;
        }
        if candidate != current_text {
            debug!(candidate, current_text, "discarding stale duplicate verdict");
            return false;
        }
        match outcome {
            CheckOutcome::Available => {
                self.checked_value = Some(candidate.to_string());
                self.unique = Some(true);
                self.failure = None;
            }
            CheckOutcome::Taken => {
                self.checked_value = Some(candidate.to_string());
                self.unique = Some(false);
                self.failure = None;
            }
            CheckOutcome::Failed(message) => {
                self.checked_value = None;
                self.unique = None;
                self.failure = Some(message.clone());
            }
        }
        true
    }

    pub fn clear_failure(&mut self) {
        self.failure = None;
    }
}

/// Issues duplicate-ID probes and owns their lifetimes. One instance per
/// registration surface; closing that surface calls [`cancel_all`] so no
/// resolution can land afterwards.
///
/// [`cancel_all`]: DuplicateChecker::cancel_all
pub struct DuplicateChecker {
    tracker: Arc<dyn TrackerApi>,
    tx: UnboundedSender<Action>,
    task_cancel: CancellationToken,
    pub state: VerdictState,
}

impl DuplicateChecker {
    pub fn new(tracker: Arc<dyn TrackerApi>, tx: UnboundedSender<Action>) -> Self {
        Self {
            tracker,
            tx,
            task_cancel: CancellationToken::new(),
            state: VerdictState::default(),
        }
    }

    /// Explicit trigger. Locally invalid text never leaves the client; a
    /// probe already pending for the same text is not reissued; a probe for
    /// different text supersedes the old one, which is cancelled outright.
    pub fn request_check(&mut self, current_text: &str) {
        if let Some(message) = validate::check_id(current_text) {
            self.state.failure = Some(message.to_string());
            return;
        }
        if self.state.pending.as_deref() == Some(current_text) {
            return;
        }
        self.task_cancel.cancel();
        self.task_cancel = CancellationToken::new();
        self.state.begin(current_text.to_string());

        let tracker = Arc::clone(&self.tracker);
        let tx = self.tx.clone();
        let cancel = self.task_cancel.clone();
        let candidate = current_text.to_string();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%candidate, "duplicate check cancelled");
                }
                result = tracker.check_id_available(&candidate) => {
                    let outcome = match result {
                        Ok(true) => CheckOutcome::Available,
                        Ok(false) => CheckOutcome::Taken,
                        Err(err) => CheckOutcome::Failed(err.user_message()),
                    };
                    let _ = tx.send(Action::DuplicateChecked { candidate, outcome });
                }
            }
        });
    }

    pub fn apply(&mut self, candidate: &str, outcome: &CheckOutcome, current_text: &str) -> bool {
        self.state.apply(candidate, outcome, current_text)
    }

    /// The Id field consumed an edit; stale failure lines go away. The
    /// verdict itself needs no touch-up, derivation handles it.
    pub fn note_edit(&mut self) {
        self.state.clear_failure();
    }

    pub fn cancel_all(&mut self) {
        self.task_cancel.cancel();
        self.task_cancel = CancellationToken::new();
        self.state.pending = None;
    }
}
