//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod ticket;

pub use ticket::{TicketEntity, TicketStatsEntity, TicketStatusDb, UsageReasonDb};
