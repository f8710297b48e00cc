//! Shared utilities for the Ticket Desk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Operator session tokens (JWT)
//! - PIN hashing with Argon2id
//! - Common validation logic

pub mod jwt;
pub mod pin;
pub mod validation;
