use std::sync::Arc;

use api::TrackerApi;
use api::types::RegisterRequest;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Paragraph,
};
use tokio::sync::mpsc::UnboundedSender;

use super::Component;
use super::fields::{FieldBinding, FieldKind};
use crate::action::{Action, Route, Workflow};
use crate::messages;
use crate::services::cache::{QueryCache, queries};
use crate::services::duplicates::DuplicateChecker;
use crate::services::mutations::{MutationCoordinator, SubmitPayload};
use crate::state::State;
use crate::tui::EventResponse;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Id,
    Password,
    Confirm,
    Nickname,
}

/// The account creation form. Field text is the only source of truth here;
/// every line under a field and the submit gate itself are derived from the
/// current text on each render.
pub struct RegistrationForm {
    id: FieldBinding,
    password: FieldBinding,
    confirm: FieldBinding,
    nickname: FieldBinding,
    focus: Focus,
    checker: DuplicateChecker,
    coordinator: MutationCoordinator,
    submit_error: Option<String>,
}

impl RegistrationForm {
    pub fn new(tracker: Arc<dyn TrackerApi>, tx: UnboundedSender<Action>, cache: QueryCache) -> Self {
        Self {
            id: FieldBinding::new(FieldKind::Id),
            password: FieldBinding::new(FieldKind::Password),
            confirm: FieldBinding::new(FieldKind::PasswordConfirm),
            nickname: FieldBinding::new(FieldKind::Nickname),
            focus: Focus::Id,
            checker: DuplicateChecker::new(Arc::clone(&tracker), tx.clone()),
            // a fresh account shows up in the author filters, so that
            // collection is the one a successful registration invalidates
            coordinator: MutationCoordinator::new(
                tracker,
                tx,
                cache,
                queries::FILTERS,
                Workflow::Registration,
            ),
            submit_error: None,
        }
    }

    /// The derived uniqueness verdict for the Id text as it stands now.
    fn verdict(&self) -> Option<bool> {
        self.checker.state.verdict_for(self.id.text())
    }

    fn gate_open(&self) -> bool {
        validate::registration_gate(
            self.id.text(),
            self.password.text(),
            self.confirm.text(),
            self.nickname.text(),
            self.verdict(),
        )
    }

    fn focused_field(&mut self) -> &mut FieldBinding {
        match self.focus {
            Focus::Id => &mut self.id,
            Focus::Password => &mut self.password,
            Focus::Confirm => &mut self.confirm,
            Focus::Nickname => &mut self.nickname,
        }
    }

    fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Id => Focus::Password,
            Focus::Password => Focus::Confirm,
            Focus::Confirm => Focus::Nickname,
            Focus::Nickname => Focus::Id,
        };
    }

    fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Id => Focus::Nickname,
            Focus::Password => Focus::Id,
            Focus::Confirm => Focus::Password,
            Focus::Nickname => Focus::Confirm,
        };
    }

    /// Enter anywhere but the Id field. Nothing happens unless the gate is
    /// open; a closed gate only reveals the lines for what is still missing.
    fn try_submit(&mut self) {
        if !self.gate_open() {
            self.id.mark_touched();
            self.password.mark_touched();
            self.confirm.mark_touched();
            self.nickname.mark_touched();
            return;
        }
        self.submit_error = None;
        self.coordinator.submit(SubmitPayload::NewAccount(RegisterRequest {
            user_id: self.id.text().to_string(),
            password: self.password.text().to_string(),
            nickname: self.nickname.text().to_string(),
        }));
    }

    /// Status line under the Id field. Pending beats everything, then the
    /// verdict for the current text, then failures and local rule lines.
    fn id_line(&self) -> Option<(String, Color)> {
        if self.checker.state.is_pending() {
            return Some((messages::CHECKING.into(), Color::DarkGray));
        }
        match self.verdict() {
            Some(true) => return Some((messages::ID_AVAILABLE.into(), Color::Green)),
            Some(false) => return Some((messages::ID_TAKEN.into(), Color::Red)),
            None => {}
        }
        if let Some(failure) = self.checker.state.failure() {
            return Some((failure.to_string(), Color::Red));
        }
        if self.id.touched() {
            if let Some(message) = validate::check_id(self.id.text()) {
                return Some((message.into(), Color::Red));
            }
        }
        None
    }

    fn rule_line(field: &FieldBinding, message: Option<&'static str>) -> Option<(String, Color)> {
        if !field.touched() {
            return None;
        }
        message.map(|m| (m.to_string(), Color::Red))
    }

    fn footer_line(&self) -> (String, Style) {
        if self.coordinator.in_flight() {
            return (
                messages::SUBMITTING.into(),
                Style::default().fg(Color::DarkGray),
            );
        }
        if let Some(error) = &self.submit_error {
            return (error.clone(), Style::default().fg(Color::Red));
        }
        if self.gate_open() {
            (
                "enter: create account".into(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                "fill every field and check the id".into(),
                Style::default().fg(Color::DarkGray),
            )
        }
    }

    /// The page is going away; nothing in flight may report afterwards.
    pub fn abandon(&mut self) {
        self.checker.cancel_all();
        self.coordinator.cancel_all();
    }
}

impl Component for RegistrationForm {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Tab => {
                self.focus_next();
                Ok(None)
            }
            KeyCode::BackTab => {
                self.focus_prev();
                Ok(None)
            }
            KeyCode::Enter => {
                if self.focus == Focus::Id {
                    let text = self.id.text().to_string();
                    self.id.mark_touched();
                    self.checker.request_check(&text);
                } else {
                    self.try_submit();
                }
                Ok(None)
            }
            _ => {
                let was_id = self.focus == Focus::Id;
                if self.focused_field().handle_key(key) && was_id {
                    self.checker.note_edit();
                }
                Ok(None)
            }
        }
    }

    fn handle_paste(
        &mut self,
        text: String,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        let was_id = self.focus == Focus::Id;
        self.focused_field().handle_paste(&text);
        if was_id {
            self.checker.note_edit();
        }
        Ok(None)
    }

    fn update(&mut self, action: Action, _state: &mut State) -> Result<Option<Action>> {
        match action {
            Action::DuplicateChecked { candidate, outcome } => {
                self.checker.apply(&candidate, &outcome, self.id.text());
                Ok(None)
            }
            Action::SubmitFinished {
                workflow: Workflow::Registration,
                outcome,
            } => {
                if self.coordinator.complete(&outcome) {
                    Ok(Some(Action::Navigate(Route::Login)))
                } else {
                    self.submit_error = outcome.err();
                    Ok(None)
                }
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
        let [_, header, id, id_line, password, password_line, confirm, confirm_line, nickname, nickname_line, footer, _] =
            Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Fill(1),
            ])
            .areas(horizontal[1]);

        frame.render_widget(
            Paragraph::new("create account").centered().style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            header,
        );

        self.id.render(frame, id, self.focus == Focus::Id);
        self.password
            .render(frame, password, self.focus == Focus::Password);
        self.confirm
            .render(frame, confirm, self.focus == Focus::Confirm);
        self.nickname
            .render(frame, nickname, self.focus == Focus::Nickname);

        let lines = [
            (id_line, self.id_line()),
            (
                password_line,
                Self::rule_line(&self.password, validate::check_password(self.password.text())),
            ),
            (
                confirm_line,
                Self::rule_line(
                    &self.confirm,
                    validate::check_password_confirm(self.password.text(), self.confirm.text()),
                ),
            ),
            (
                nickname_line,
                Self::rule_line(&self.nickname, validate::check_nickname(self.nickname.text())),
            ),
        ];
        for (line_area, line) in lines {
            if let Some((text, color)) = line {
                frame.render_widget(
                    Paragraph::new(text).style(Style::default().fg(color)),
                    line_area,
                );
            }
        }

        let (footer_text, footer_style) = self.footer_line();
        frame.render_widget(
            Paragraph::new(footer_text).centered().style(footer_style),
            footer,
        );

        Ok(())
    }
}
