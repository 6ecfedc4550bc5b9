//! Domain layer for the EventHub backend.
//!
//! This crate contains:
//! - Domain models (accounts, events, registrations, merchandise, teams)
//! - Status enums and their transition rules
//! - Ticket, invite code, and initial password generation

pub mod models;
pub mod services;
