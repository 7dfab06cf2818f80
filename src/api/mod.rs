//! Project API client module for HTTP communication

mod client;
mod error;
mod traits;

pub use client::{HttpProjectClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use traits::{ProjectApi, ProjectQuery};

#[cfg(test)]
pub use error::ServerMessage;
#[cfg(test)]
pub use traits::MockProjectApi;
