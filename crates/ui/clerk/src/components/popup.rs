//! Shared chrome for modal dialogs: backdrop, centering, bordered shell.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Block, Clear},
};

/// Paint the page behind a dialog dark. Terminals have no alpha channel,
/// so a solid fill stands in for dimming.
pub fn render_backdrop(frame: &mut Frame<'_>, area: Rect) {
    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Black)),
        area,
    );
}

/// Center a fixed-size rect inside `area`, shrinking it when the terminal
/// is too small.
pub fn centered_rect_fixed(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Clear `area` and draw the dialog shell. Content renders inside the
/// returned rect.
pub fn draw_popup_frame(frame: &mut Frame<'_>, area: Rect, title: impl Into<String>) -> Rect {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::bordered()
            .border_set(symbols::border::ROUNDED)
            .title(format!(" {} ", title.into()))
            .style(Style::default().fg(Color::White).bg(Color::Black)),
        area,
    );
    area
}
