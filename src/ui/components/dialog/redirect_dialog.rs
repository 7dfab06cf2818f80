//! Login redirect dialog

use super::base::{render_dialog, DialogConfig};
use crate::auth::PendingRedirect;
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    Frame,
};

/// Show the authorize URL while the sign-in callback is awaited
pub fn render_redirect_dialog(frame: &mut Frame, redirect: &PendingRedirect) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let hint = vec![
        Span::styled("Enter", key_style),
        Span::raw(" open browser  "),
        Span::styled("Esc", key_style),
        Span::raw(" cancel"),
    ];
    let message = format!(
        "Open this address in a browser to sign in:\n\n{}\n\nWaiting for the browser. You continue at {} once signed in; unsaved form input is not kept.",
        redirect.url, redirect.return_to
    );

    render_dialog(
        frame,
        DialogConfig {
            title: "Sign-in required",
            title_color: Color::Yellow,
            border_color: Color::Yellow,
            message: &message,
            hint: Some(hint),
            max_width: 80,
        },
    );
}
