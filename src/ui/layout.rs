//! Layout components (header, status bar)

use crate::app::{App, Screen};
use crate::platform::{SAVE_SHORTCUT, SELECT_ALL_SHORTCUT};
use crate::state::{Field, ProfileTab};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Split the screen into header and content, reserving the bottom line for
/// the status bar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    (chunks[0], chunks[1])
}

/// Draw the header with the current route and identity
pub fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let user = if app.identity.is_authenticated() {
        app.identity
            .user()
            .and_then(|u| u.nickname.or(u.name).or(u.email))
            .unwrap_or_else(|| "signed in".to_string())
    } else {
        "signed out".to_string()
    };

    let spans = vec![
        Span::styled(
            " Folio ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.route.path(), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(format!("👤 {user}"), Style::default().fg(Color::Blue)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    let session = if app.identity.is_authenticated() {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ○ ", Style::default().fg(Color::Red))
    };
    spans.push(session);

    spans.push(Span::styled(
        view_hints(&app.screen),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Keyboard hints for the current view
fn view_hints(screen: &Screen) -> String {
    match screen {
        Screen::Home => "n:new project  p:profile  l:sign in/out  q:quit".to_string(),
        Screen::Authoring(view) => match view.focus {
            Field::Body => format!(
                "Tab:next  Alt+b/i/s:marks  Alt+1-6:heading  Alt+u/o:lists  {SELECT_ALL_SHORTCUT}:all  {SAVE_SHORTCUT}:save  Esc:cancel"
            ),
            Field::Industry => format!("←/→:choose  Tab:next  {SAVE_SHORTCUT}:save  Esc:cancel"),
            _ => format!("Tab:next  Ctrl+U:clear  {SAVE_SHORTCUT}:save  Esc:cancel"),
        },
        Screen::Detail { .. } => "e:edit  Esc:back".to_string(),
        Screen::Profile { tab, .. } => match tab {
            ProfileTab::Info => "Tab:projects  n:new  l:logout  Esc:back".to_string(),
            ProfileTab::Projects => "Tab:info  r:reload  n:new  l:logout  Esc:back".to_string(),
        },
    }
}
