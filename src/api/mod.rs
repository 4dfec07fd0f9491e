//! Doctors HTTP API.
//!
//! JSON views for the doctors screens and multipart form posts for
//! create and edit. Every request is logged by the audit middleware.
//!
//! The router is composable: `doctors_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::doctors_router;
pub use server::{start_server_on, DoctorServer, ServerSession};
pub use types::ApiContext;
