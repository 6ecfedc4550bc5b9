//! Application services.

pub mod admin_bootstrap;
pub mod cookies;
pub mod csv_export;
pub mod email;
pub mod qr;

pub use cookies::CookieHelper;
pub use email::EmailService;
