//! Form domain layer
//!
//! Type-safe form state, validation and server error remapping for the
//! project create/edit views.

mod field;
mod form_state;
mod validation;

pub use field::Field;
pub use form_state::{FieldErrors, ProjectForm, ProjectPayload};
pub use validation::{remap_server_errors, validate, MIN_BODY_LEN};
