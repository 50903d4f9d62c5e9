use std::sync::Arc;

use api::TrackerApi;
use api::types::LoginRequest;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::Page;
use crate::action::{Action, Route};
use crate::components::fields::{FieldBinding, FieldKind};
use crate::messages;
use crate::services::session;
use crate::state::{InputMode, State};
use crate::tui::{Event, EventResponse};
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Id,
    Password,
}

/// Sign-in screen. One attempt at a time; the outcome lands back on the
/// event loop as [`Action::LoginFinished`] and only `App` flips the session.
pub struct LoginPage {
    tracker: Arc<dyn TrackerApi>,
    tx: UnboundedSender<Action>,
    cancel: CancellationToken,
    id: FieldBinding,
    password: FieldBinding,
    focus: Focus,
    pending: bool,
    message: Option<String>,
}

impl LoginPage {
    pub fn new(tracker: Arc<dyn TrackerApi>, tx: UnboundedSender<Action>) -> Self {
        Self {
            tracker,
            tx,
            cancel: CancellationToken::new(),
            id: FieldBinding::new(FieldKind::Id),
            password: FieldBinding::new(FieldKind::Password),
            focus: Focus::Id,
            pending: false,
            message: None,
        }
    }

    fn focused_field(&mut self) -> &mut FieldBinding {
        match self.focus {
            Focus::Id => &mut self.id,
            Focus::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Id => Focus::Password,
            Focus::Password => Focus::Id,
        };
    }

    fn clear_credentials(&mut self) {
        self.id = FieldBinding::new(FieldKind::Id);
        self.password = FieldBinding::new(FieldKind::Password);
        self.focus = Focus::Id;
    }

    fn try_login(&mut self) {
        if self.pending {
            return;
        }
        let violation = validate::check_id(self.id.text())
            .or_else(|| validate::check_password(self.password.text()));
        if let Some(message) = violation {
            self.message = Some(message.to_string());
            return;
        }
        self.message = None;
        self.pending = true;
        session::spawn_login(
            Arc::clone(&self.tracker),
            self.tx.clone(),
            self.cancel.clone(),
            LoginRequest {
                user_id: self.id.text().to_string(),
                password: self.password.text().to_string(),
            },
        );
    }

    fn status_line(&self) -> (String, Style) {
        if self.pending {
            return (
                messages::SIGNING_IN.into(),
                Style::default().fg(Color::DarkGray),
            );
        }
        if let Some(message) = &self.message {
            return (message.clone(), Style::default().fg(Color::Red));
        }
        (String::new(), Style::default())
    }
}

impl Page for LoginPage {
    fn name(&self) -> &str {
        "login"
    }

    fn focus(&mut self, state: &mut State) -> Result<()> {
        state.input_mode = InputMode::Insert;
        Ok(())
    }

    fn unfocus(&mut self, state: &mut State) -> Result<()> {
        state.input_mode = InputMode::Normal;
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.pending = false;
        self.clear_credentials();
        Ok(())
    }

    fn handle_events(
        &mut self,
        event: Event,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                self.focused_field().handle_paste(&text);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action, _state: &mut State) -> Result<Option<Action>> {
        match action {
            Action::LoginFinished(Ok(_)) => {
                // App flips the session and navigates; this page only has to
                // stop holding the credentials
                self.pending = false;
                self.clear_credentials();
                Ok(None)
            }
            Action::LoginFinished(Err(message)) => {
                self.pending = false;
                self.message = Some(message);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, _state: &State) -> Result<()> {
        let horizontal = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(50),
            Constraint::Fill(1),
        ])
        .split(area);
        let [_, header, id, password, status, footer, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(horizontal[1]);

        frame.render_widget(
            Paragraph::new("issuedesk").centered().style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            header,
        );
        self.id.render(frame, id, self.focus == Focus::Id);
        self.password
            .render(frame, password, self.focus == Focus::Password);

        let (status_text, status_style) = self.status_line();
        frame.render_widget(
            Paragraph::new(status_text).centered().style(status_style),
            status,
        );
        frame.render_widget(
            Paragraph::new("enter: sign in   f2: create account   ctrl-c: quit")
                .centered()
                .style(Style::default().fg(Color::DarkGray)),
            footer,
        );

        Ok(())
    }
}

impl LoginPage {
    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                Ok(None)
            }
            KeyCode::Enter => {
                self.try_login();
                Ok(None)
            }
            KeyCode::F(2) => Ok(Some(EventResponse::Stop(Action::Navigate(Route::Register)))),
            _ => {
                if self.pending {
                    // the attempt already left with a snapshot of the fields
                    return Ok(None);
                }
                self.focused_field().handle_key(key);
                self.message = None;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use api::ApiError;
    use api::types::{
        FilterSummary, LoginResponse, MilestoneDraft, MilestoneOverview, RegisterRequest,
    };
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;
    use crate::services::cache::QueryCache;
    use crate::services::session::SessionGate;

    struct FakeTracker {
        password: &'static str,
    }

    #[async_trait::async_trait]
    impl TrackerApi for FakeTracker {
        async fn check_id_available(&self, _user_id: &str) -> Result<bool, ApiError> {
            unreachable!("duplicate checks are not exercised here")
        }

        async fn register(&self, _request: RegisterRequest) -> Result<(), ApiError> {
            unreachable!("registration is not exercised here")
        }

        async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
            if request.password != self.password {
                return Err(ApiError::Status {
                    status: 401,
                    message: "wrong id or password.".into(),
                });
            }
            Ok(LoginResponse {
                user_id: request.user_id,
                nickname: "Moss".into(),
            })
        }

        async fn fetch_milestones(&self) -> Result<Vec<MilestoneOverview>, ApiError> {
            unreachable!("milestones are not exercised here")
        }

        async fn fetch_filters(&self) -> Result<FilterSummary, ApiError> {
            unreachable!("filters are not exercised here")
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

    fn page_with(password: &'static str) -> (LoginPage, UnboundedReceiver<Action>, State) {
        let (tx, rx) = mpsc::unbounded_channel();
        let page = LoginPage::new(Arc::new(FakeTracker { password }), tx);
        let state = State::new(SessionGate::new().signal(), QueryCache::new());
        (page, rx, state)
    }

    fn press(page: &mut LoginPage, state: &mut State, code: KeyCode) {
        page.handle_events(
            Event::Key(KeyEvent::new(code, KeyModifiers::NONE)),
            state,
        )
        .unwrap();
    }

    fn type_text(page: &mut LoginPage, state: &mut State, text: &str) {
        for c in text.chars() {
            press(page, state, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn successful_login_reports_the_profile() {
        let (mut page, mut rx, mut state) = page_with("hunter2");
        type_text(&mut page, &mut state, "mossy");
        press(&mut page, &mut state, KeyCode::Tab);
        type_text(&mut page, &mut state, "hunter2");
        press(&mut page, &mut state, KeyCode::Enter);
        assert!(page.pending);

        let Some(Action::LoginFinished(outcome)) = rx.recv().await else {
            panic!("expected a login completion");
        };
        let profile = outcome.expect("login should succeed");
        assert_eq!(profile.user_id, "mossy");
        assert_eq!(profile.nickname, "Moss");
    }

    #[tokio::test]
    async fn rejected_login_surfaces_the_server_message() {
        let (mut page, mut rx, mut state) = page_with("hunter2");
        type_text(&mut page, &mut state, "mossy");
        press(&mut page, &mut state, KeyCode::Tab);
        type_text(&mut page, &mut state, "wrong");
        press(&mut page, &mut state, KeyCode::Enter);

        let Some(action @ Action::LoginFinished(_)) = rx.recv().await else {
            panic!("expected a login completion");
        };
        page.update(action, &mut state).unwrap();
        assert!(!page.pending);
        assert_eq!(page.message.as_deref(), Some("wrong id or password."));
    }

    #[tokio::test]
    async fn empty_fields_never_reach_the_wire() {
        let (mut page, mut rx, mut state) = page_with("hunter2");
        press(&mut page, &mut state, KeyCode::Enter);
        tokio::task::yield_now().await;

        assert!(!page.pending);
        assert_eq!(page.message.as_deref(), Some(messages::ID_REQUIRED));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn second_enter_while_pending_is_ignored() {
        let (mut page, mut rx, mut state) = page_with("hunter2");
        type_text(&mut page, &mut state, "mossy");
        press(&mut page, &mut state, KeyCode::Tab);
        type_text(&mut page, &mut state, "hunter2");
        press(&mut page, &mut state, KeyCode::Enter);
        press(&mut page, &mut state, KeyCode::Enter);

        assert!(rx.recv().await.is_some());
        // exactly one attempt went out
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn navigating_away_cancels_the_attempt_and_drops_credentials() {
        let (mut page, mut rx, mut state) = page_with("hunter2");
        type_text(&mut page, &mut state, "mossy");
        press(&mut page, &mut state, KeyCode::Tab);
        type_text(&mut page, &mut state, "hunter2");
        press(&mut page, &mut state, KeyCode::Enter);

        page.unfocus(&mut state).unwrap();
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
        assert!(page.id.is_empty());
        assert!(page.password.is_empty());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn f2_heads_to_registration() {
        let (mut page, _rx, mut state) = page_with("hunter2");
        let response = page
            .handle_events(
                Event::Key(KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE)),
                &mut state,
            )
            .unwrap();
        assert_eq!(
            response,
            Some(EventResponse::Stop(Action::Navigate(Route::Register)))
        );
    }
}
