//! HTTP layer: routing, controllers and JSON error responses.
//!
//! Controllers validate parameters, call into `nasa_core`, and shape the
//! response. Upstream errors surface through [`error::AppError`].

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
