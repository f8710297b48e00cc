//! Domain layer for Ticket Desk.
//!
//! This crate contains:
//! - The ticket model and its status state machine
//! - Request/response DTOs for issuance, scanning and sessions
//! - Scan payload parsing

pub mod models;
pub mod services;
