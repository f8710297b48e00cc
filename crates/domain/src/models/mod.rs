//! Domain models for Ticket Desk.

pub mod scan;
pub mod session;
pub mod ticket;

pub use scan::{ScanOutcome, ScanRequest, ScanResponse};
pub use session::{CreateSessionRequest, SessionResponse};
pub use ticket::{
    share_url, CreateTicketRequest, IssuedTicketResponse, ListTicketsResponse, NewTicket,
    PublicTicketView, StatusChange, StatusFilter, Ticket, TicketStats, TicketStatus,
    UsageReason,
};
