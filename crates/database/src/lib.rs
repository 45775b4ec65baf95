//! # Archivist Database Crate
//!
//! This crate is the only place that talks to PostgreSQL.
//!
//! ## Architectural Principles
//!
//! - **One Connection:** A run opens exactly one `PgConnection`, pings it, and
//!   holds it for every export query. There is no pool and no retry.
//! - **Server-Side JSON:** Each export target is aggregated with `json_agg` on
//!   the server. The client receives the array as text and keeps it as an
//!   unparsed `RawValue`, so column values are never re-encoded.
//!
//! ## Public API
//!
//! - `connect`: Opens and pings the connection.
//! - `ViewSource`: The trait the export loop queries through.
//! - `ViewRepository`: The `ViewSource` backed by the live connection.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod views;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_options};
pub use error::DbError;
pub use views::{ViewRepository, ViewSource, aggregate_query};
