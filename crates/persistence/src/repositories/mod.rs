//! Repository implementations for database operations.

pub mod ticket;

pub use ticket::TicketRepository;
