use crate::services::cache::QueryCache;
use crate::services::session::SessionSignal;

/// Which layer owns plain keystrokes. Keymap lookups only fire in `Normal`;
/// while a form has focus the page switches to `Insert` and characters go to
/// the focused field instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
}

/// Shared read surface handed to every page and component. Pages may flip
/// `input_mode`; session and cache writes stay with their owning services.
#[derive(Clone)]
pub struct State {
    pub input_mode: InputMode,
    pub session: SessionSignal,
    pub cache: QueryCache,
}

impl State {
    pub fn new(session: SessionSignal, cache: QueryCache) -> Self {
        Self {
            input_mode: InputMode::Normal,
            session,
            cache,
        }
    }
}
