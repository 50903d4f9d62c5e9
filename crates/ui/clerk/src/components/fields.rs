use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

/// Every text field the client renders, with its input policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Id,
    Password,
    PasswordConfirm,
    Nickname,
    Title,
    Deadline,
    Description,
}

impl FieldKind {
    /// Hard cap enforced at the keyboard. A field never holds more
    /// characters than this.
    pub fn max_len(&self) -> usize {
        match self {
            Self::Id | Self::Nickname => 16,
            Self::Password | Self::PasswordConfirm => 12,
            Self::Title => 50,
            Self::Deadline => 12,
            Self::Description => 200,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Id => " id ",
            Self::Password => " password ",
            Self::PasswordConfirm => " confirm password ",
            Self::Nickname => " nickname ",
            Self::Title => " title ",
            Self::Deadline => " deadline (YYYY. MM. DD) ",
            Self::Description => " description ",
        }
    }

    pub fn masked(&self) -> bool {
        matches!(self, Self::Password | Self::PasswordConfirm)
    }
}

/// One text input bound to a [`FieldKind`].
///
/// Keystrokes pass through to the underlying buffer except insertions past
/// the kind's cap, which are swallowed here so over-long values cannot
/// exist anywhere downstream.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    kind: FieldKind,
    input: Input,
    touched: bool,
}

impl FieldBinding {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            input: Input::default(),
            touched: false,
        }
    }

    /// Start from existing text, stored verbatim with the cursor at the end.
    /// Edit screens prefill through this.
    pub fn prefilled(kind: FieldKind, text: &str) -> Self {
        Self {
            kind,
            input: Input::new(text.to_string()),
            touched: false,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    fn char_count(&self) -> usize {
        self.input.value().chars().count()
    }

    /// Feed a key event in. Returns whether the field consumed it.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let KeyCode::Char(_) = key.code {
            let plain = !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
            if plain && self.char_count() >= self.kind.max_len() {
                // at the cap: consume and drop
                self.touched = true;
                return true;
            }
        }
        match self.input.handle_event(&CrosstermEvent::Key(key)) {
            Some(_) => {
                self.touched = true;
                true
            }
            None => false,
        }
    }

    /// Terminal paste, inserted character by character up to the cap.
    pub fn handle_paste(&mut self, text: &str) {
        for c in text.chars() {
            if self.char_count() >= self.kind.max_len() {
                break;
            }
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            let _ = self.input.handle_event(&CrosstermEvent::Key(key));
        }
        self.touched = true;
    }

    fn display_text(&self) -> String {
        if self.kind.masked() {
            self.input.value().chars().map(|_| '*').collect()
        } else {
            self.input.value().to_string()
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect, focused: bool) {
        let width = area.width.max(3) - 3;
        let scroll = self.input.visual_scroll(width as usize);
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let widget = Paragraph::new(self.display_text())
            .scroll((0, scroll as u16))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.kind.label())
                    .border_style(border_style),
            );
        frame.render_widget(widget, area);

        if focused {
            let x = (self.input.visual_cursor().max(scroll) - scroll) as u16;
            frame.set_cursor_position((area.x + 1 + x, area.y + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(field: &mut FieldBinding, c: char) {
        field.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[test]
    fn accepts_up_to_the_cap_and_drops_the_rest() {
        let mut field = FieldBinding::new(FieldKind::Password);
        for c in "abcdefghijklmnop".chars() {
            press(&mut field, c);
        }
        assert_eq!(field.text(), "abcdefghijkl");
        assert_eq!(field.text().chars().count(), 12);
    }

    #[test]
    fn id_cap_is_sixteen() {
        let mut field = FieldBinding::new(FieldKind::Id);
        for c in "abcdefghijklmnopqrst".chars() {
            press(&mut field, c);
        }
        assert_eq!(field.text(), "abcdefghijklmnop");
    }

    #[test]
    fn backspace_still_works_at_the_cap() {
        let mut field = FieldBinding::new(FieldKind::Password);
        for c in "abcdefghijkl".chars() {
            press(&mut field, c);
        }
        field.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(field.text(), "abcdefghijk");
        press(&mut field, 'z');
        assert_eq!(field.text(), "abcdefghijkz");
    }

    #[test]
    fn prefill_is_verbatim() {
        let field = FieldBinding::prefilled(FieldKind::Title, "release  candidate ");
        assert_eq!(field.text(), "release  candidate ");
        assert!(!field.touched());
    }

    #[test]
    fn paste_truncates_at_the_cap() {
        let mut field = FieldBinding::new(FieldKind::Password);
        field.handle_paste("this is far longer than twelve");
        assert_eq!(field.text().chars().count(), 12);
        assert!(field.touched());
    }

    #[test]
    fn typing_marks_touched() {
        let mut field = FieldBinding::new(FieldKind::Id);
        assert!(!field.touched());
        press(&mut field, 'a');
        assert!(field.touched());
    }

    #[test]
    fn cap_counts_characters_not_bytes() {
        let mut field = FieldBinding::new(FieldKind::Password);
        for _ in 0..12 {
            press(&mut field, 'ü');
        }
        press(&mut field, 'x');
        assert_eq!(field.text().chars().count(), 12);
    }
}
