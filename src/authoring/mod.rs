//! Authoring workflow: the create/edit lifecycle and the read views around it

mod controller;
mod detail;
mod error;
mod listing;
mod scope;

pub use controller::{AuthoringController, LoadOutcome, SubmitOutcome};
pub use detail::{DetailOutcome, ProjectDetailLoader};
pub use listing::{ListOutcome, ListTask, ProjectListLoader};
