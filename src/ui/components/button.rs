//! Toolbar button component

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a toolbar toggle. `is_active` reflects the editor state under the
/// cursor; disabled buttons are drawn dimmed.
pub fn render_toggle_button(
    frame: &mut Frame,
    area: Rect,
    glyph: &str,
    is_active: bool,
    is_enabled: bool,
) {
    let border_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text_style = if !is_enabled {
        Style::default().fg(Color::DarkGray)
    } else if is_active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(format!(" {glyph} ")).style(text_style);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(paragraph.block(block), area);
}

/// Width a toggle needs for `glyph`
pub fn toggle_width(glyph: &str) -> u16 {
    glyph.chars().count() as u16 + 4
}
