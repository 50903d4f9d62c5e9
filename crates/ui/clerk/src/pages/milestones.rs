use std::sync::Arc;

use api::TrackerApi;
use api::types::{FilterSummary, MilestoneOverview};
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Page;
use crate::action::Action;
use crate::components::Component;
use crate::components::milestone_board::MilestoneBoard;
use crate::messages;
use crate::services::cache::queries;
use crate::state::State;
use crate::tui::{Event, EventResponse};

/// The signed-in landing screen: milestone table plus the filter counts.
///
/// Reading is cache-first. Every tick the page looks at the cached state
/// and fetches whatever is stale or missing, one request per collection at
/// a time; stale rows keep rendering while their replacement is in the air.
pub struct MilestonesPage {
    tracker: Arc<dyn TrackerApi>,
    tx: UnboundedSender<Action>,
    cancel: CancellationToken,
    board: MilestoneBoard,
    milestones_pending: bool,
    filters_pending: bool,
    fetch_failed: bool,
    message: Option<String>,
}

impl MilestonesPage {
    pub fn new(tracker: Arc<dyn TrackerApi>, tx: UnboundedSender<Action>) -> Self {
        Self {
            tracker,
            tx,
            cancel: CancellationToken::new(),
            board: MilestoneBoard::new(),
            milestones_pending: false,
            filters_pending: false,
            fetch_failed: false,
            message: None,
        }
    }

    /// Issue fetches for whatever the cache cannot serve fresh. After a
    /// failure the page sits still until an explicit refresh so a dead
    /// server is not hammered once per tick.
    fn maybe_fetch(&mut self, state: &State) {
        if self.fetch_failed {
            return;
        }
        if !self.milestones_pending
            && state
                .cache
                .read::<Vec<MilestoneOverview>>(queries::MILESTONES)
                .needs_fetch()
        {
            self.milestones_pending = true;
            let tracker = Arc::clone(&self.tracker);
            let tx = self.tx.clone();
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("milestone fetch cancelled");
                    }
                    result = tracker.fetch_milestones() => {
                        let outcome = result.map_err(|err| err.user_message());
                        let _ = tx.send(Action::MilestonesLoaded(outcome));
                    }
                }
            });
        }
        if !self.filters_pending
            && state
                .cache
                .read::<FilterSummary>(queries::FILTERS)
                .needs_fetch()
        {
            self.filters_pending = true;
            let tracker = Arc::clone(&self.tracker);
            let tx = self.tx.clone();
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("filter fetch cancelled");
                    }
                    result = tracker.fetch_filters() => {
                        let outcome = result.map_err(|err| err.user_message());
                        let _ = tx.send(Action::FiltersLoaded(outcome));
                    }
                }
            });
        }
    }

    fn filters_line(&self, state: &State) -> String {
        match state
            .cache
            .read::<FilterSummary>(queries::FILTERS)
            .payload()
        {
            Some(summary) => format!(
                "issues: {} open / {} closed   labels: {}   milestones: {}   authors: {}",
                summary.issue_counts.open_issue_count,
                summary.issue_counts.close_issue_count,
                summary.labels.len(),
                summary.milestones.len(),
                summary.authors.len(),
            ),
            None => messages::LOADING.to_string(),
        }
    }

    fn status_line(&self) -> (String, Style) {
        if let Some(message) = &self.message {
            return (message.clone(), Style::default().fg(Color::Red));
        }
        if self.milestones_pending || self.filters_pending {
            return (
                messages::LOADING.into(),
                Style::default().fg(Color::DarkGray),
            );
        }
        (
            "j/k: move   n: new   e: edit   r: refresh   l: logout   q: quit".into(),
            Style::default().fg(Color::DarkGray),
        )
    }
}

impl Page for MilestonesPage {
    fn name(&self) -> &str {
        "milestones"
    }

    fn focus(&mut self, state: &mut State) -> Result<()> {
        // seed the table from cache, stale rows included, then let the tick
        // path refresh them
        if let Some(rows) = state
            .cache
            .read::<Vec<MilestoneOverview>>(queries::MILESTONES)
            .payload()
        {
            self.board.set_rows(rows);
        }
        self.maybe_fetch(state);
        Ok(())
    }

    fn unfocus(&mut self, _state: &mut State) -> Result<()> {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.milestones_pending = false;
        self.filters_pending = false;
        self.fetch_failed = false;
        self.message = None;
        Ok(())
    }

    fn handle_events(
        &mut self,
        event: Event,
        state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        self.board.handle_events(event, state)
    }

    fn update(&mut self, action: Action, state: &mut State) -> Result<Option<Action>> {
        match action {
            Action::Tick => {
                self.maybe_fetch(state);
            }
            Action::Refresh => {
                state.cache.invalidate(queries::MILESTONES);
                state.cache.invalidate(queries::FILTERS);
                self.fetch_failed = false;
                self.message = None;
                self.maybe_fetch(state);
            }
            Action::MilestonesLoaded(Ok(rows)) => {
                self.milestones_pending = false;
                state.cache.store(queries::MILESTONES, &rows);
                self.board.set_rows(rows);
            }
            Action::MilestonesLoaded(Err(message)) => {
                self.milestones_pending = false;
                self.fetch_failed = true;
                self.message = Some(message);
            }
            Action::FiltersLoaded(Ok(summary)) => {
                self.filters_pending = false;
                state.cache.store(queries::FILTERS, &summary);
            }
            Action::FiltersLoaded(Err(message)) => {
                self.filters_pending = false;
                self.fetch_failed = true;
                self.message = Some(message);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, state: &State) -> Result<()> {
        let [filters, table, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(self.filters_line(state))
                .block(Block::default().borders(Borders::ALL).title(" filters ")),
            filters,
        );
        self.board.draw(frame, table, state)?;

        let (status_text, status_style) = self.status_line();
        frame.render_widget(Paragraph::new(status_text).style(status_style), status);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use api::ApiError;
    use api::types::{
        AuthorOverview, IssueCounts, LoginRequest, LoginResponse, MilestoneDraft, RegisterRequest,
    };
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::services::cache::{QueryCache, QueryState};
    use crate::services::session::SessionGate;

    #[derive(Default)]
    struct FakeTracker {
        fail: bool,
    }

    fn sample_rows() -> Vec<MilestoneOverview> {
        vec![MilestoneOverview {
            milestone_id: 1,
            title: "launch".into(),
            description: None,
            deadline: "2024. 09. 01".parse().unwrap(),
            total_issue: 3,
            closed_issue: 1,
            is_closed: false,
        }]
    }

    fn sample_filters() -> FilterSummary {
        FilterSummary {
            issue_counts: IssueCounts {
                open_issue_count: 2,
                close_issue_count: 1,
            },
            labels: Vec::new(),
            milestones: Vec::new(),
            authors: vec![AuthorOverview {
                user_id: "mossy".into(),
            }],
        }
    }

    #[async_trait::async_trait]
    impl TrackerApi for FakeTracker {
        async fn check_id_available(&self, _user_id: &str) -> Result<bool, ApiError> {
            unreachable!("duplicate checks are not exercised here")
        }

        async fn register(&self, _request: RegisterRequest) -> Result<(), ApiError> {
            unreachable!("registration is not exercised here")
        }

        async fn login(&self, _request: LoginRequest) -> Result<LoginResponse, ApiError> {
            unreachable!("login is not exercised here")
        }

        async fn fetch_milestones(&self) -> Result<Vec<MilestoneOverview>, ApiError> {
            if self.fail {
                return Err(ApiError::Status {
                    status: 502,
                    message: String::new(),
                });
            }
            Ok(sample_rows())
        }

        async fn fetch_filters(&self) -> Result<FilterSummary, ApiError> {
            if self.fail {
                return Err(ApiError::Status {
                    status: 502,
                    message: String::new(),
                });
            }
            Ok(sample_filters())
        }

        async fn create_milestone(&self, _draft: MilestoneDraft) -> Result<(), ApiError> {
            unreachable!("milestone creation is not exercised here")
        }

        async fn update_milestone(
            &self,
            _milestone_id: u64,
            _draft: MilestoneDraft,
        ) -> Result<(), ApiError> {
            unreachable!("milestone updates are not exercised here")
        }
    }

    fn page_with(fail: bool) -> (MilestonesPage, UnboundedReceiver<Action>, State) {
        let (tx, rx) = mpsc::unbounded_channel();
        let page = MilestonesPage::new(Arc::new(FakeTracker { fail }), tx);
        let state = State::new(SessionGate::new().signal(), QueryCache::new());
        (page, rx, state)
    }

    async fn drain_two_loads(
        page: &mut MilestonesPage,
        state: &mut State,
        rx: &mut UnboundedReceiver<Action>,
    ) {
        for _ in 0..2 {
            let Some(action) = rx.recv().await else {
                panic!("expected a load completion");
            };
            page.update(action, state).unwrap();
        }
    }

    #[tokio::test]
    async fn missing_cache_triggers_both_fetches() {
        let (mut page, mut rx, mut state) = page_with(false);
        page.focus(&mut state).unwrap();
        assert!(page.milestones_pending);
        assert!(page.filters_pending);

        drain_two_loads(&mut page, &mut state, &mut rx).await;

        assert!(matches!(
            state.cache.read::<Vec<MilestoneOverview>>(queries::MILESTONES),
            QueryState::Fresh(_)
        ));
        assert!(matches!(
            state.cache.read::<FilterSummary>(queries::FILTERS),
            QueryState::Fresh(_)
        ));
        assert_eq!(page.board.selected().map(|r| r.milestone_id), Some(1));
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_fetching() {
        let (mut page, mut rx, mut state) = page_with(false);
        state.cache.store(queries::MILESTONES, &sample_rows());
        state.cache.store(queries::FILTERS, &sample_filters());

        page.focus(&mut state).unwrap();
        page.update(Action::Tick, &mut state).unwrap();
        tokio::task::yield_now().await;

        assert!(!page.milestones_pending);
        assert!(!page.filters_pending);
        assert!(rx.try_recv().is_err());
        assert_eq!(page.board.selected().map(|r| r.milestone_id), Some(1));
    }

    #[tokio::test]
    async fn stale_rows_keep_rendering_while_the_refetch_runs() {
        let (mut page, mut rx, mut state) = page_with(false);
        state.cache.store(queries::MILESTONES, &sample_rows());
        state.cache.store(queries::FILTERS, &sample_filters());
        page.focus(&mut state).unwrap();

        state.cache.invalidate(queries::MILESTONES);
        page.update(Action::Tick, &mut state).unwrap();

        // refetch is in flight, the old rows are still on the board
        assert!(page.milestones_pending);
        assert_eq!(page.board.selected().map(|r| r.milestone_id), Some(1));

        let Some(action) = rx.recv().await else {
            panic!("expected a load completion");
        };
        page.update(action, &mut state).unwrap();
        assert!(matches!(
            state.cache.read::<Vec<MilestoneOverview>>(queries::MILESTONES),
            QueryState::Fresh(_)
        ));
    }

    #[tokio::test]
    async fn a_failed_fetch_parks_until_refresh() {
        let (mut page, mut rx, mut state) = page_with(true);
        page.focus(&mut state).unwrap();
        drain_two_loads(&mut page, &mut state, &mut rx).await;

        assert!(page.fetch_failed);
        assert_eq!(page.message.as_deref(), Some("request failed (502)."));

        // ticks no longer spawn anything
        page.update(Action::Tick, &mut state).unwrap();
        assert!(!page.milestones_pending);
        assert!(!page.filters_pending);

        // refresh clears the park and goes again
        page.update(Action::Refresh, &mut state).unwrap();
        assert!(page.milestones_pending);
        assert!(page.filters_pending);
    }

    #[tokio::test]
    async fn refresh_marks_both_collections_stale() {
        let (mut page, mut rx, mut state) = page_with(false);
        state.cache.store(queries::MILESTONES, &sample_rows());
        state.cache.store(queries::FILTERS, &sample_filters());
        page.focus(&mut state).unwrap();

        page.update(Action::Refresh, &mut state).unwrap();
        assert!(page.milestones_pending);
        assert!(page.filters_pending);
        drain_two_loads(&mut page, &mut state, &mut rx).await;
        assert!(matches!(
            state.cache.read::<FilterSummary>(queries::FILTERS),
            QueryState::Fresh(_)
        ));
    }

    #[tokio::test]
    async fn leaving_the_page_cancels_inflight_fetches() {
        let (mut page, mut rx, mut state) = page_with(false);
        page.focus(&mut state).unwrap();
        page.unfocus(&mut state).unwrap();
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
        assert!(!page.milestones_pending);
    }
}
