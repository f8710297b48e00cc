//! Application services used by route handlers.

pub mod issuance;
pub mod redemption;
pub mod session;

pub use issuance::issue_ticket;
pub use redemption::redeem;
pub use session::login;
