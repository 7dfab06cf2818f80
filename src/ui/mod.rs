//! UI module for rendering the TUI

mod components;
mod detail;
mod editor;
mod forms;
mod home;
mod layout;
mod profile;
mod widgets;

use crate::app::{App, Screen};
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (header_area, main_area) = layout::create_layout(frame.area());

    layout::draw_header(frame, header_area, app);

    match &app.screen {
        Screen::Home => home::draw(frame, main_area, app),
        Screen::Authoring(view) => forms::draw_project_form(frame, main_area, view),
        Screen::Detail { loader, .. } => detail::draw(frame, main_area, loader, app),
        Screen::Profile {
            tab,
            list,
            selected,
        } => profile::draw(frame, main_area, *tab, list, *selected, app),
    }

    layout::draw_status_bar(frame, app);

    // Modal overlays
    if let Some(redirect) = &app.pending_redirect {
        components::render_redirect_dialog(frame, redirect);
    } else if let Some(error) = app.errors.first() {
        components::render_error_dialog(frame, error, app.errors.len() - 1);
    }
}
