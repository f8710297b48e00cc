//! Persistence layer for Ticket Desk.
//!
//! This crate contains:
//! - The `TicketStore` abstraction and its error type
//! - PostgreSQL connection management, migrations and query metrics
//! - Entity definitions (database row mappings)
//! - The PostgreSQL repository and the in-memory store

pub mod db;
pub mod entities;
pub mod memory;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use memory::InMemoryTicketStore;
pub use repositories::TicketRepository;
pub use store::{StatusUpdate, StoreError, TicketStore};
