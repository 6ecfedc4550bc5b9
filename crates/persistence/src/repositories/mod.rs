//! Repository implementations.

mod chat;
mod event;
mod password_reset;
mod registration;
mod team;
mod user;

pub use chat::ChatRepository;
pub use event::{BrowseFilter, EventRepository};
pub use password_reset::PasswordResetRepository;
pub use registration::{PurchaseError, RegistrationRepository};
pub use team::TeamRepository;
pub use user::{OrganizerProfilePatch, ParticipantProfilePatch, UserRepository};
