//! Entity definitions (database row mappings).

mod chat_message;
mod event;
mod merchandise_item;
mod password_reset;
mod purchase_item;
mod registration;
mod team;
mod user;

pub use chat_message::{ChatMessageEntity, ChatMessageWithSenderEntity};
pub use event::{EventEntity, EventStatusDb, EventTypeDb, EventWithCountEntity, NewEventRow};
pub use merchandise_item::MerchandiseItemEntity;
pub use password_reset::{PasswordResetEntity, PasswordResetWithUserEntity, ResetStatusDb};
pub use purchase_item::{PurchaseItemWithNameEntity, PurchaseLine};
pub use registration::{
    PaymentStatusDb, RegistrationDetailEntity, RegistrationEntity, RegistrationStatusDb,
};
pub use team::{TeamEntity, TeamMemberWithUserEntity, TeamWithEventEntity};
pub use user::{OrganizerWithEventCountEntity, UserEntity, UserRoleDb};
