//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod events;
pub mod health;
pub mod organizers;
pub mod participants;
pub mod registrations;
pub mod teams;
