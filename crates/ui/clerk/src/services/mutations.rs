use std::sync::Arc;

use api::{ApiError, TrackerApi};
use api::types::{MilestoneDraft, RegisterRequest};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::{Action, Workflow};
use crate::messages;
use crate::services::cache::{QueryCache, QueryKey};

/// What a submit sends. Milestone drafts carry their own create/update
/// discriminator; accounts are always created.
pub enum SubmitPayload {
    NewAccount(RegisterRequest),
    Milestone(MilestoneDraft),
}

/// Drives one surface's writes: admission while pending, the create/update
/// split, and the single cache invalidation a success is worth.
///
/// Completions must come back through [`complete`] on the event loop; the
/// spawned task itself never touches shared state, so cancelling it is
/// always safe and silent.
///
/// [`complete`]: MutationCoordinator::complete
pub struct MutationCoordinator {
    tracker: Arc<dyn TrackerApi>,
    tx: UnboundedSender<Action>,
    cache: QueryCache,
    owned_key: QueryKey,
    workflow: Workflow,
    cancel: CancellationToken,
    in_flight: bool,
}

impl MutationCoordinator {
    pub fn new(
        tracker: Arc<dyn TrackerApi>,
        tx: UnboundedSender<Action>,
        cache: QueryCache,
        owned_key: QueryKey,
        workflow: Workflow,
    ) -> Self {
        Self {
            tracker,
            tx,
            cache,
            owned_key,
            workflow,
            cancel: CancellationToken::new(),
            in_flight: false,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Kick off the write. Refused (returns false) while an earlier submit
    /// is still pending; callers render their submit control disabled off
    /// [`in_flight`] for the same reason.
    ///
    /// [`in_flight`]: MutationCoordinator::in_flight
    pub fn submit(&mut self, payload: SubmitPayload) -> bool {
        if self.in_flight {
            debug!(workflow = %self.workflow, "submit refused while one is pending");
            return false;
        }
        self.in_flight = true;

        let tracker = Arc::clone(&self.tracker);
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        let workflow = self.workflow;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%workflow, "submit cancelled");
                }
                result = run_submit(tracker, payload) => {
                    let outcome = result.map_err(|err| {
                        if workflow == Workflow::Registration && err.is_conflict() {
                            messages::ID_TAKEN.to_string()
                        } else {
                            err.user_message()
                        }
                    });
                    let _ = tx.send(Action::SubmitFinished { workflow, outcome });
                }
            }
        });
        true
    }

    /// Apply a completion. Success marks the owning collection stale, once,
    /// and returns true so the caller runs its completion hook. Failure
    /// invalidates nothing and leaves every caller-side value in place;
    /// only the message line should change.
    pub fn complete(&mut self, outcome: &Result<(), String>) -> bool {
        self.in_flight = false;
        match outcome {
            Ok(()) => {
                self.cache.invalidate(self.owned_key);
                true
            }
            Err(message) => {
                warn!(workflow = %self.workflow, %message, "submit failed");
                false
            }
        }
    }

    /// The owning surface is going away; outstanding work must not report.
    pub fn cancel_all(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.in_flight = false;
    }
}

async fn run_submit(tracker: Arc<dyn TrackerApi>, payload: SubmitPayload) -> Result<(), ApiError> {
    match payload {
        SubmitPayload::NewAccount(request) => tracker.register(request).await,
        SubmitPayload::Milestone(draft) => match draft.milestone_id {
            Some(milestone_id) => tracker.update_milestone(milestone_id, draft).await,
            None => tracker.create_milestone(draft).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use api::types::{FilterSummary, LoginRequest, LoginResponse, MilestoneOverview};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;
    use crate::services::cache::{QueryState, queries};

    #[derive(Default)]
    struct FakeTracker {
        hang: bool,
        fail_status: Option<u16>,
        registered: AtomicUsize,
        created: Mutex<Vec<String>>,
        updated: Mutex<Vec<(u64, String)>>,
    }

    impl FakeTracker {
        async fn outcome(&self) -> Result<(), ApiError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            match self.fail_status {
                Some(status) => Err(ApiError::Status {
                    status,
                    message: String::new(),
                }),
                None => Ok(()),
            }
        }
    }

    #[async_trait::async_trait]
    impl TrackerApi for FakeTracker {
        async fn check_id_available(&self, _user_id: &str) -> Result<bool, ApiError> {
            unreachable!("duplicate checks are not exercised here")
        }

        async fn register(&self, _request: RegisterRequest) -> Result<(), ApiError> {
            self.registered.fetch_add(1, Ordering::SeqCst);
            self.outcome().await
        }

        async fn login(&self, _request: LoginRequest) -> Result<LoginResponse, ApiError> {
            unreachable!("login is not exercised here")
        }

        async fn fetch_milestones(&self) -> Result<Vec<MilestoneOverview>, ApiError> {
            unreachable!("milestone fetches are not exercised here")
        }

        async fn fetch_filters(&self) -> Result<FilterSummary, ApiError> {
            unreachable!("filter fetches are not exercised here")
        }

        async fn create_milestone(&self, draft: MilestoneDraft) -> Result<(), ApiError> {
            self.created.lock().unwrap().push(draft.title.clone());
            self.outcome().await
        }

        async fn update_milestone(
            &self,
            milestone_id: u64,
            draft: MilestoneDraft,
        ) -> Result<(), ApiError> {
            self.updated
                .lock()
                .unwrap()
                .push((milestone_id, draft.title.clone()));
            self.outcome().await
        }
    }

    fn milestone_draft(milestone_id: Option<u64>) -> MilestoneDraft {
        MilestoneDraft {
            milestone_id,
            title: "beta".into(),
            description: None,
            deadline: "2024. 06. 01".parse().unwrap(),
        }
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            user_id: "mossy".into(),
            password: "hunter2".into(),
            nickname: "Moss".into(),
        }
    }

    fn coordinator_with(
        fake: FakeTracker,
        owned_key: QueryKey,
        workflow: Workflow,
    ) -> (
        MutationCoordinator,
        Arc<FakeTracker>,
        QueryCache,
        mpsc::UnboundedReceiver<Action>,
    ) {
        let fake = Arc::new(fake);
        let (tx, rx) = mpsc::unbounded_channel();
        let cache = QueryCache::new();
        let coordinator = MutationCoordinator::new(
            Arc::clone(&fake) as Arc<dyn TrackerApi>,
            tx,
            cache.clone(),
            owned_key,
            workflow,
        );
        (coordinator, fake, cache, rx)
    }

    async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<Action>) -> Result<(), String> {
        let Some(Action::SubmitFinished { outcome, .. }) = rx.recv().await else {
            panic!("expected a submit completion");
        };
        outcome
    }

    #[tokio::test]
    async fn success_invalidates_the_owning_collection() {
        let (mut coordinator, _, cache, mut rx) =
            coordinator_with(FakeTracker::default(), queries::MILESTONES, Workflow::Milestone);
        cache.store(queries::MILESTONES, &1u64);
        cache.store(queries::FILTERS, &2u64);

        assert!(coordinator.submit(SubmitPayload::Milestone(milestone_draft(None))));
        let outcome = next_outcome(&mut rx).await;
        assert_eq!(outcome, Ok(()));

        assert!(coordinator.complete(&outcome));
        assert!(!coordinator.in_flight());
        assert!(cache.read::<u64>(queries::MILESTONES).needs_fetch());
        // unrelated collections are untouched
        assert_eq!(cache.read::<u64>(queries::FILTERS), QueryState::Fresh(2));
    }

    #[tokio::test]
    async fn draft_id_selects_create_versus_update() {
        let (mut coordinator, fake, _, mut rx) =
            coordinator_with(FakeTracker::default(), queries::MILESTONES, Workflow::Milestone);

        coordinator.submit(SubmitPayload::Milestone(milestone_draft(None)));
        let outcome = next_outcome(&mut rx).await;
        coordinator.complete(&outcome);

        coordinator.submit(SubmitPayload::Milestone(milestone_draft(Some(7))));
        let outcome = next_outcome(&mut rx).await;
        coordinator.complete(&outcome);

        assert_eq!(*fake.created.lock().unwrap(), vec!["beta".to_string()]);
        assert_eq!(*fake.updated.lock().unwrap(), vec![(7, "beta".to_string())]);
    }

    #[tokio::test]
    async fn pending_submits_refuse_a_second_one() {
        let (mut coordinator, fake, _, _rx) = coordinator_with(
            FakeTracker {
                hang: true,
                ..Default::default()
            },
            queries::FILTERS,
            Workflow::Registration,
        );

        assert!(coordinator.submit(SubmitPayload::NewAccount(register_request())));
        assert!(coordinator.in_flight());
        assert!(!coordinator.submit(SubmitPayload::NewAccount(register_request())));
        tokio::task::yield_now().await;
        assert_eq!(fake.registered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_keeps_the_cache_and_reports_the_message() {
        let (mut coordinator, _, cache, mut rx) = coordinator_with(
            FakeTracker {
                fail_status: Some(500),
                ..Default::default()
            },
            queries::FILTERS,
            Workflow::Registration,
        );
        cache.store(queries::FILTERS, &2u64);

        coordinator.submit(SubmitPayload::NewAccount(register_request()));
        let outcome = next_outcome(&mut rx).await;
        assert_eq!(outcome, Err("request failed (500).".to_string()));

        assert!(!coordinator.complete(&outcome));
        assert!(!coordinator.in_flight());
        assert_eq!(cache.read::<u64>(queries::FILTERS), QueryState::Fresh(2));
    }

    #[tokio::test]
    async fn registration_conflict_reads_as_taken_id() {
        let (mut coordinator, _, _, mut rx) = coordinator_with(
            FakeTracker {
                fail_status: Some(409),
                ..Default::default()
            },
            queries::FILTERS,
            Workflow::Registration,
        );

        coordinator.submit(SubmitPayload::NewAccount(register_request()));
        let outcome = next_outcome(&mut rx).await;
        assert_eq!(outcome, Err(messages::ID_TAKEN.to_string()));
    }

    #[tokio::test]
    async fn cancelled_submits_report_nothing() {
        let (mut coordinator, _, cache, mut rx) = coordinator_with(
            FakeTracker {
                hang: true,
                ..Default::default()
            },
            queries::MILESTONES,
            Workflow::Milestone,
        );
        cache.store(queries::MILESTONES, &1u64);

        coordinator.submit(SubmitPayload::Milestone(milestone_draft(None)));
        coordinator.cancel_all();
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
        assert!(!coordinator.in_flight());
        assert_eq!(cache.read::<u64>(queries::MILESTONES), QueryState::Fresh(1));
    }
}
