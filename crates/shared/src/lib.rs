//! Shared utilities and common types for the EventHub backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - Session token (JWT) generation and validation
//! - Cursor pagination for message history
//! - Common validation logic

pub mod pagination;
pub mod password;
pub mod token;
pub mod validation;
