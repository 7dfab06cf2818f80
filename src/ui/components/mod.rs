//! Reusable UI components

mod button;
mod dialog;

pub use button::{render_toggle_button, toggle_width, BUTTON_HEIGHT};
pub use dialog::{render_error_dialog, render_redirect_dialog, wrap_text};
