//! Browser-facing HTTP layer: the REST API and the embedded page.

pub mod server;
pub mod templates;

pub use server::{AppState, build_router, start_server};
