//! Field rendering utilities for forms

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Bordered block for a form input. A field error turns the border red and
/// is shown in the bottom border.
pub fn field_block<'a>(label: &'a str, is_active: bool, error: Option<&'a str>) -> Block<'a> {
    let border_style = match (error, is_active) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Cyan),
        (None, false) => Style::default().fg(Color::DarkGray),
    };

    let mut block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(border_style);
    if let Some(message) = error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {message} "),
            Style::default().fg(Color::Red),
        )));
    }
    block
}

/// Draw a single-line text input
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    is_active: bool,
    error: Option<&str>,
) {
    let style = if is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };

    let display_value = if value.is_empty() && !is_active {
        "(empty)"
    } else {
        value
    };
    let cursor = if is_active { "▌" } else { "" };

    let content = Paragraph::new(Line::from(vec![
        Span::styled(display_value, style),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]));

    frame.render_widget(
        content
            .wrap(Wrap { trim: false })
            .block(field_block(label, is_active, error)),
        area,
    );
}

/// Draw a select input showing the chosen option between arrows
pub fn draw_select(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    selected: Option<&str>,
    is_active: bool,
    error: Option<&str>,
) {
    let arrow_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let value = match selected {
        Some(option) => Span::raw(option.to_string()),
        None => Span::styled("Select an industry", Style::default().fg(Color::DarkGray)),
    };

    let content = Paragraph::new(Line::from(vec![
        Span::styled("◀ ", arrow_style),
        value,
        Span::styled(" ▶", arrow_style),
    ]));

    frame.render_widget(content.block(field_block(label, is_active, error)), area);
}
