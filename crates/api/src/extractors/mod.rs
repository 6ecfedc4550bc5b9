//! Custom Axum extractors.

pub mod session;

pub use session::{Admin, Organizer, Participant, Session};
