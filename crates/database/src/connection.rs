use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::Connection;
use std::str::FromStr;

/// Translates the run's connection settings into driver options.
///
/// Every field is set explicitly so nothing is picked up from the `PG*`
/// environment variables the driver would otherwise consult.
pub fn connect_options(settings: &DatabaseSettings) -> Result<PgConnectOptions, DbError> {
    let ssl_mode = PgSslMode::from_str(&settings.ssl_mode).map_err(|e| {
        DbError::ConnectionConfigError(format!("invalid DB_SSLMODE {:?}: {}", settings.ssl_mode, e))
    })?;

    Ok(PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.name)
        .ssl_mode(ssl_mode))
}

/// Opens a single connection to the PostgreSQL database and checks that it
/// answers a ping.
///
/// There is no pool and no retry: a run needs exactly one connection, and a
/// database that cannot be reached ends the run.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgConnection, DbError> {
    let options = connect_options(settings)?;
    let mut conn = PgConnection::connect_with(&options).await?;
    conn.ping().await.map_err(DbError::PingError)?;

    tracing::info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        "Successfully connected to the database."
    );
    Ok(conn)
}
