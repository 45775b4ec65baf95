use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("The database did not respond to a ping: {0}")]
    PingError(#[source] sqlx::Error),

    #[error("Query for export '{target}' failed: {source}")]
    QueryError {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Export '{target}' returned invalid JSON: {source}")]
    JsonError {
        target: String,
        #[source]
        source: serde_json::Error,
    },
}
