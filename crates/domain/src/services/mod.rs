//! Domain services.

pub mod ticketing;
