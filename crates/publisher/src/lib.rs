//! # Archivist Publisher Crate
//!
//! Commits the snapshot directory and pushes it to the configured remote by
//! driving the `git` command-line tool.
//!
//! Every command runs with an explicit working directory taken from the
//! `GitRepository` handle; the process's own current directory is never
//! touched.

pub mod error;
pub mod repository;

pub use error::PublishError;
pub use repository::{CommitOutcome, GitRepository, PublishOutcome};
