use std::sync::Arc;

use api::TrackerApi;
use color_eyre::Result;
use crossterm::event::KeyCode;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use super::Page;
use crate::action::{Action, Route};
use crate::components::Component;
use crate::components::registration::RegistrationForm;
use crate::services::cache::QueryCache;
use crate::state::{InputMode, State};
use crate::tui::{Event, EventResponse};

/// Hosts the registration form. Esc backs out to the sign-in screen; the
/// form itself emits the navigation when an account lands.
pub struct RegisterPage {
    form: RegistrationForm,
}

impl RegisterPage {
    pub fn new(tracker: Arc<dyn TrackerApi>, tx: UnboundedSender<Action>, cache: QueryCache) -> Self {
        Self {
            form: RegistrationForm::new(tracker, tx, cache),
        }
    }
}

impl Page for RegisterPage {
    fn name(&self) -> &str {
        "register"
    }

    fn focus(&mut self, state: &mut State) -> Result<()> {
        state.input_mode = InputMode::Insert;
        Ok(())
    }

    fn unfocus(&mut self, state: &mut State) -> Result<()> {
        state.input_mode = InputMode::Normal;
        self.form.abandon();
        Ok(())
    }

    fn handle_events(
        &mut self,
        event: Event,
        state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if let Some(response) = self.form.handle_events(event.clone(), state)? {
            return Ok(Some(response));
        }
        if let Event::Key(key) = event {
            if key.code == KeyCode::Esc {
                return Ok(Some(EventResponse::Stop(Action::Navigate(Route::Login))));
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: Action, state: &mut State) -> Result<Option<Action>> {
        self.form.update(action, state)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, state: &State) -> Result<()> {
        self.form.draw(frame, area, state)
    }
}
