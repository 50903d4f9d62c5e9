use std::sync::Arc;

use api::TrackerApi;
use api::dates::CanonicalDate;
use api::types::{MilestoneDraft, MilestoneOverview};
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
use super::popup::{centered_rect_fixed, draw_popup_frame, render_backdrop};
use crate::action::{Action, Workflow};
use crate::messages;
use crate::services::cache::{QueryCache, queries};
use crate::services::mutations::{MutationCoordinator, SubmitPayload};
use crate::state::State;
use crate::tui::EventResponse;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Title,
    Deadline,
    Description,
}

/// Modal create/edit dialog for milestones. Carrying a `milestone_id` is
/// what makes it an edit; everything else is identical between the two.
///
/// While a submit is in flight the dialog goes inert: keystrokes are
/// swallowed so the payload cannot drift, and only Esc still works, which
/// cancels the attempt outright.
pub struct MilestoneEditor {
    milestone_id: Option<u64>,
    title: FieldBinding,
    deadline: FieldBinding,
    description: FieldBinding,
    focus: Focus,
    coordinator: MutationCoordinator,
    submit_error: Option<String>,
}

impl MilestoneEditor {
    pub fn new(
        tracker: Arc<dyn TrackerApi>,
        tx: UnboundedSender<Action>,
        cache: QueryCache,
        prefill: Option<MilestoneOverview>,
    ) -> Self {
        let coordinator = MutationCoordinator::new(
            tracker,
            tx,
            cache,
            queries::MILESTONES,
            Workflow::Milestone,
        );
        match prefill {
            Some(row) => Self {
                milestone_id: Some(row.milestone_id),
                title: FieldBinding::prefilled(FieldKind::Title, &row.title),
                deadline: FieldBinding::prefilled(FieldKind::Deadline, &row.deadline.to_string()),
                description: FieldBinding::prefilled(
                    FieldKind::Description,
                    row.description.as_deref().unwrap_or_default(),
                ),
                focus: Focus::Title,
                coordinator,
                submit_error: None,
            },
            None => Self {
                milestone_id: None,
                title: FieldBinding::new(FieldKind::Title),
                deadline: FieldBinding::prefilled(
                    FieldKind::Deadline,
                    &CanonicalDate::today().to_string(),
                ),
                description: FieldBinding::new(FieldKind::Description),
                focus: Focus::Title,
                coordinator,
                submit_error: None,
            },
        }
    }

    pub fn is_edit(&self) -> bool {
        self.milestone_id.is_some()
    }

    fn gate_open(&self) -> bool {
        validate::milestone_gate(self.title.text(), self.deadline.text())
    }

    fn focused_field(&mut self) -> &mut FieldBinding {
        match self.focus {
            Focus::Title => &mut self.title,
            Focus::Deadline => &mut self.deadline,
            Focus::Description => &mut self.description,
        }
    }

    fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Title => Focus::Deadline,
            Focus::Deadline => Focus::Description,
            Focus::Description => Focus::Title,
        };
    }

    fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Title => Focus::Description,
            Focus::Deadline => Focus::Title,
            Focus::Description => Focus::Deadline,
        };
    }

    fn try_submit(&mut self) {
        if !self.gate_open() {
            self.title.mark_touched();
            self.deadline.mark_touched();
            return;
        }
        let Ok(deadline) = self.deadline.text().parse::<CanonicalDate>() else {
            return;
        };
        let description = match self.description.text() {
            "" => None,
            text => Some(text.to_string()),
        };
        self.submit_error = None;
        self.coordinator.submit(SubmitPayload::Milestone(MilestoneDraft {
            milestone_id: self.milestone_id,
            title: self.title.text().to_string(),
            description,
            deadline,
        }));
    }

    /// Esc path: whatever is in flight stays silent, then the dialog closes.
    fn dismiss(&mut self) -> Action {
        self.abandon();
        Action::ClosePopup
    }

    /// Teardown hook for the owner. Anything still in flight goes silent.
    pub fn abandon(&mut self) {
        self.coordinator.cancel_all();
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
                "enter: save   esc: close".into(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (
                "a title and a valid date are required".into(),
                Style::default().fg(Color::DarkGray),
            )
        }
    }
}

impl Component for MilestoneEditor {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if key.code == KeyCode::Esc {
            return Ok(Some(EventResponse::Stop(self.dismiss())));
        }
        if self.coordinator.in_flight() {
            // inert while pending; the payload already left
            return Ok(None);
        }
        match key.code {
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            KeyCode::Enter => self.try_submit(),
            _ => {
                self.focused_field().handle_key(key);
            }
        }
        Ok(None)
    }

    fn handle_paste(
        &mut self,
        text: String,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if !self.coordinator.in_flight() {
            self.focused_field().handle_paste(&text);
        }
        Ok(None)
    }

    fn update(&mut self, action: Action, _state: &mut State) -> Result<Option<Action>> {
        if let Action::SubmitFinished {
            workflow: Workflow::Milestone,
            outcome,
        } = action
        {
            if self.coordinator.complete(&outcome) {
                return Ok(Some(Action::ClosePopup));
            }
            self.submit_error = outcome.err();
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, _state: &State) -> Result<()> {
        render_backdrop(frame, area);
        let dialog = centered_rect_fixed(area, 56, 16);
        let title = if self.is_edit() {
            "edit milestone"
        } else {
            "new milestone"
        };
        draw_popup_frame(frame, dialog, title);

        let [title_area, title_line, deadline_area, deadline_line, description_area, footer] =
            Layout::vertical([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .vertical_margin(1)
            .horizontal_margin(2)
            .areas(dialog);

        self.title
            .render(frame, title_area, self.focus == Focus::Title);
        self.deadline
            .render(frame, deadline_area, self.focus == Focus::Deadline);
        self.description
            .render(frame, description_area, self.focus == Focus::Description);

        if self.title.touched() {
            if let Some(message) = validate::check_title(self.title.text()) {
                frame.render_widget(
                    Paragraph::new(message).style(Style::default().fg(Color::Red)),
                    title_line,
                );
            }
        }
        if self.deadline.touched() {
            if let Some(message) = validate::check_deadline(self.deadline.text()) {
                frame.render_widget(
                    Paragraph::new(message).style(Style::default().fg(Color::Red)),
                    deadline_line,
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
