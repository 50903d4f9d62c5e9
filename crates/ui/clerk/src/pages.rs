use color_eyre::Result;
use ratatui::{Frame, layout::Rect};

use crate::{
    action::Action,
    state::State,
    tui::{Event, EventResponse},
};

mod login;
mod milestones;
mod register;

pub use login::LoginPage;
pub use milestones::MilestonesPage;
pub use register::RegisterPage;

/// A `Page` composes `Component`s and exposes a lifecycle similar to the
/// `Component` trait but at the page level. Exactly one page is active at a
/// time; `focus`/`unfocus` bracket its tenure on screen.
pub trait Page {
    fn name(&self) -> &str;

    /// The page became the active one.
    fn focus(&mut self, _state: &mut State) -> Result<()> {
        Ok(())
    }

    /// The page is being navigated away from. Outstanding work it spawned
    /// must be cancelled here so nothing reports into the next screen.
    fn unfocus(&mut self, _state: &mut State) -> Result<()> {
        Ok(())
    }

    fn handle_events(
        &mut self,
        event: Event,
        state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        let _ = (event, state);
        Ok(None)
    }

    fn update(&mut self, action: Action, state: &mut State) -> Result<Option<Action>> {
        let _ = (action, state);
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, state: &State) -> Result<()>;
}
