use api::types::MilestoneOverview;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table, TableState},
};

use super::Component;
use crate::action::Action;
use crate::state::State;
use crate::tui::EventResponse;

/// The milestone table. Pure presentation over whatever rows the page last
/// handed in; fetching and caching happen elsewhere.
pub struct MilestoneBoard {
    rows: Vec<MilestoneOverview>,
    table_state: TableState,
}

impl MilestoneBoard {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            table_state: TableState::default(),
        }
    }

    /// Replace the rows, keeping the selection on a valid index.
    pub fn set_rows(&mut self, rows: Vec<MilestoneOverview>) {
        self.rows = rows;
        let selected = match self.table_state.selected() {
            _ if self.rows.is_empty() => None,
            Some(i) => Some(i.min(self.rows.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    pub fn selected(&self) -> Option<&MilestoneOverview> {
        self.table_state.selected().and_then(|i| self.rows.get(i))
    }

    fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) => (i + 1) % self.rows.len(),
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let prev = match self.table_state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(prev));
    }

    fn progress_cell(row: &MilestoneOverview) -> String {
        let percent = if row.total_issue == 0 {
            0
        } else {
            row.closed_issue * 100 / row.total_issue
        };
        format!("{}/{} ({percent}%)", row.closed_issue, row.total_issue)
    }
}

impl Default for MilestoneBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for MilestoneBoard {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                Ok(None)
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                Ok(None)
            }
            KeyCode::Char('n') => Ok(Some(EventResponse::Stop(Action::OpenMilestoneEditor(
                None,
            )))),
            KeyCode::Char('e') | KeyCode::Enter => Ok(self
                .selected()
                .cloned()
                .map(|row| EventResponse::Stop(Action::OpenMilestoneEditor(Some(row))))),
            _ => Ok(None),
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, _state: &State) -> Result<()> {
        let header = Row::new(["title", "deadline", "progress", "state"]).style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        let rows = self.rows.iter().map(|row| {
            Row::new([
                row.title.clone(),
                row.deadline.to_string(),
                Self::progress_cell(row),
                if row.is_closed { "closed" } else { "open" }.to_string(),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Length(14),
                Constraint::Length(16),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" milestones (n: new, e: edit) "),
        );
        frame.render_stateful_widget(table, area, &mut self.table_state);
        Ok(())
    }
}
