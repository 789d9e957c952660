//! HTTP API module.
//!
//! This module provides the HTTP server, API types and log streaming for the
//! bookdash backend.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{create_router, start_server, AppState};
pub use types::*;
pub use logs::*;
