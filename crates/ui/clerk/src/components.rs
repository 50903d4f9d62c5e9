use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::{
    action::Action,
    state::State,
    tui::{Event, EventResponse},
};

pub mod fields;
pub mod milestone_board;
pub mod milestone_editor;
pub mod popup;
pub mod registration;

/// A drawable, event-consuming piece of a page. The loop hands every
/// component events through `handle_events`, drained actions through
/// `update`, and a frame region through `draw`.
pub trait Component {
    fn init(&mut self, _state: &State) -> Result<()> {
        Ok(())
    }

    fn handle_events(
        &mut self,
        event: Event,
        state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        match event {
            Event::Key(key_event) => self.handle_key_events(key_event, state),
            Event::Paste(text) => self.handle_paste(text, state),
            _ => Ok(None),
        }
    }

    fn handle_key_events(
        &mut self,
        _key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn handle_paste(
        &mut self,
        _text: String,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn update(&mut self, _action: Action, _state: &mut State) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &State) -> Result<()>;
}
