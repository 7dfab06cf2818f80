//! Landing view

use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };

    let greeting = match app.identity.user() {
        Some(user) if app.identity.is_authenticated() => {
            format!("Welcome back, {}.", user.name.unwrap_or(user.sub))
        }
        _ => "Showcase what you build.".to_string(),
    };

    let session_action = if app.identity.is_authenticated() {
        "  sign out"
    } else {
        "  sign in"
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Folio",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(greeting),
        Line::from(""),
        Line::from(vec![key("n"), Span::raw("  create a project")]),
        Line::from(vec![key("p"), Span::raw("  your profile and projects")]),
        Line::from(vec![key("l"), Span::raw(session_action)]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}
