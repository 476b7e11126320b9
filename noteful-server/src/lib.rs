//! HTTP front end for the Noteful core library.
//!
//! [`rest::create_router`] maps `/api/notes`, `/api/folders` and `/api/tags`
//! onto the core resource handlers and turns every handler result into exactly
//! one JSON response.

pub mod rest;
pub mod settings;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
///
/// `log` records from the core library are forwarded into the same output.
/// Calling this twice is harmless; the second call is a no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
