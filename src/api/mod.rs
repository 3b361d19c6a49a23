//! API Module
//!
//! Local HTTP surface over the catalogue cache and the archive reader.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
