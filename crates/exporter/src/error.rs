use thiserror::Error;

/// Why a single export target was skipped.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Query(#[from] database::DbError),

    #[error(transparent)]
    Snapshot(#[from] snapshot::SnapshotError),
}
