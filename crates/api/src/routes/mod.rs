//! HTTP route handlers.

pub mod admin;
pub mod health;
pub mod scans;
pub mod session;
pub mod tickets;
