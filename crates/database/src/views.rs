use crate::error::DbError;
use async_trait::async_trait;
use configuration::ExportTarget;
use serde_json::value::RawValue;
use sqlx::Connection;
use sqlx::postgres::{PgConnection, Postgres};

/// Anything that can produce the rows of an export target as one JSON array.
///
/// The export loop only depends on this trait, so it can run against the live
/// database or an in-memory fake.
#[async_trait]
pub trait ViewSource: Send {
    /// Returns the target's rows as a JSON array, embedded verbatim.
    /// A target with no rows yields `[]`.
    async fn fetch_rows(&mut self, target: &ExportTarget) -> Result<Box<RawValue>, DbError>;
}

/// Runs the export queries over a single, exclusively owned connection.
#[derive(Debug)]
pub struct ViewRepository {
    conn: PgConnection,
}

impl ViewRepository {
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Closes the underlying connection, telling the server we are done.
    pub async fn close(self) -> Result<(), DbError> {
        self.conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl ViewSource for ViewRepository {
    async fn fetch_rows(&mut self, target: &ExportTarget) -> Result<Box<RawValue>, DbError> {
        let sql = aggregate_query(&target.query);
        tracing::debug!(export = %target.name, sql = %sql, "Querying export target.");

        let text = sqlx::query_scalar::<Postgres, Option<String>>(&sql)
            .fetch_one(&mut self.conn)
            .await
            .map_err(|source| DbError::QueryError {
                target: target.name.clone(),
                source,
            })?;

        rows_fragment(&target.name, text)
    }
}

/// Wraps a source query so the server aggregates every row into one JSON
/// array. The cast to `text` hands back the server's own encoding of the
/// array, so no row is ever decoded on the client.
pub fn aggregate_query(query: &str) -> String {
    let inner = query.trim().trim_end_matches(';').trim_end();
    format!("SELECT json_agg(t)::text FROM ({}) t", inner)
}

/// Turns the aggregate's result into a JSON fragment. `json_agg` over zero
/// rows is SQL `NULL`, which becomes an empty array.
pub fn rows_fragment(target: &str, text: Option<String>) -> Result<Box<RawValue>, DbError> {
    let text = text.unwrap_or_else(|| "[]".to_string());
    RawValue::from_string(text).map_err(|source| DbError::JsonError {
        target: target.to_string(),
        source,
    })
}
