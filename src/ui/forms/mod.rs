//! Form rendering module
//!
//! - `field_renderer`: text and select inputs with inline errors
//! - `project_form`: the project create/edit page

mod field_renderer;
mod project_form;

pub use field_renderer::field_block;
pub use project_form::draw_project_form;
