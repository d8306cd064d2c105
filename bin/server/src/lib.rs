//! HTTP boundary and process wiring for the gemini-relay bot.
//!
//! The core (conversation engine, context store, transport controller)
//! lives in the library crates; this crate only loads configuration,
//! constructs the pieces, and exposes the HTTP surface: health check,
//! webhook callback, and administrative clear.

pub mod config;
pub mod routes;
