//! # Archivist Snapshot Crate
//!
//! Turns the aggregated rows of one export target into the dated JSON file
//! that gets committed.
//!
//! ## Public API
//!
//! - `ExportDocument`: The `{ "data": [...], "export_date": "YYYY-MM-DD" }`
//!   wrapper. `data` is a pre-serialized fragment that is written as-is.
//! - `indent`: Re-indents JSON text by moving whitespace only.
//! - `SnapshotWriter`: Owns the output directory and writes `<name>.json`.
//! - `SnapshotError`: The specific error types that can be returned from this crate.

pub mod document;
pub mod error;
pub mod writer;

pub use document::{ExportDocument, indent};
pub use error::SnapshotError;
pub use writer::SnapshotWriter;
