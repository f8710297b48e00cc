//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod operator;
pub mod validated_json;

pub use operator::Operator;
pub use validated_json::ValidatedJson;
