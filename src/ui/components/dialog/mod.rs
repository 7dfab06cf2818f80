//! Dialog components for TUI

mod base;
mod error_dialog;
mod redirect_dialog;

pub use base::wrap_text;
pub use error_dialog::render_error_dialog;
pub use redirect_dialog::render_redirect_dialog;
