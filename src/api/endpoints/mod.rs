//! API endpoint handlers.

pub mod doctors;
pub mod health;
