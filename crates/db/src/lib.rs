//! MySQL implementation of the database session.
//!
//! [`MySqlConnector`] opens a single `sqlx` connection (no pool) with
//! autocommit disabled. [`MySqlSession`] sends statements as raw SQL
//! text, so no prepared-statement parameterization takes place.
//!
//! The session keeps the server's own `sql_mode` and `time_zone`: sqlx's
//! defaults for both are switched off in [`session_defaults`].

use std::time::Duration;

use async_trait::async_trait;
use scriptdeploy_core::{
    ConnectParams, DatabaseSession, LoaderError, LoaderResult, Secret, SessionConnector,
};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor};

/// Opens [`MySqlSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

/// One MySQL connection with caller-driven transactions.
#[derive(Debug)]
pub struct MySqlSession {
    conn: MySqlConnection,
}

/// Build connect options from the target and credentials.
pub fn connect_options(params: &ConnectParams, secret: &Secret) -> MySqlConnectOptions {
    session_defaults(
        MySqlConnectOptions::new()
            .host(&params.host)
            .port(params.port)
            .username(&secret.username)
            .password(&secret.password)
            .database(&params.database),
    )
}

/// Stop sqlx from rewriting `sql_mode` and `time_zone` on connect.
///
/// Without this, `||` turns into string concatenation and `NOW()` is
/// reported in UTC instead of the server's zone.
pub fn session_defaults(options: MySqlConnectOptions) -> MySqlConnectOptions {
    options
        .pipes_as_concat(false)
        .no_engine_substitution(false)
        .timezone(None::<String>)
}

impl MySqlConnector {
    /// Open a session from prepared options.
    pub async fn open_with(
        &self,
        options: &MySqlConnectOptions,
        timeout: Duration,
    ) -> LoaderResult<MySqlSession> {
        let mut conn = connect_within(timeout, options).await?;

        if let Err(e) = (&mut conn).execute("SET autocommit = 0").await {
            if let Err(close_err) = conn.close().await {
                tracing::warn!(error = %close_err, "Failed to close MySQL connection");
            }
            return Err(LoaderError::Connection(format!(
                "Failed to disable autocommit: {e}"
            )));
        }

        Ok(MySqlSession { conn })
    }
}

#[async_trait]
impl SessionConnector for MySqlConnector {
    type Session = MySqlSession;

    async fn open(&self, params: &ConnectParams, secret: &Secret) -> LoaderResult<MySqlSession> {
        let options = connect_options(params, secret);
        let session = self
            .open_with(&options, params.connect_timeout)
            .await
            .map_err(|e| {
                tracing::error!(host = %params.host, error = %e, "Error connecting to MySQL");
                e
            })?;

        tracing::info!(
            host = %params.host,
            port = params.port,
            database = %params.database,
            "Connected to MySQL"
        );
        Ok(session)
    }
}

/// Connect, failing with [`LoaderError::Connection`] after `timeout`.
async fn connect_within(
    timeout: Duration,
    options: &MySqlConnectOptions,
) -> LoaderResult<MySqlConnection> {
    match tokio::time::timeout(timeout, MySqlConnection::connect_with(options)).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(e)) => Err(LoaderError::Connection(e.to_string())),
        Err(_) => Err(LoaderError::Connection(format!(
            "timed out after {}s",
            timeout.as_secs_f64()
        ))),
    }
}

#[async_trait]
impl DatabaseSession for MySqlSession {
    async fn execute(&mut self, statement: &str) -> LoaderResult<()> {
        let done = (&mut self.conn)
            .execute(statement)
            .await
            .map_err(|e| LoaderError::StatementExecution(e.to_string()))?;
        tracing::debug!(rows_affected = done.rows_affected(), "Statement executed");
        Ok(())
    }

    async fn commit(&mut self) -> LoaderResult<()> {
        (&mut self.conn)
            .execute("COMMIT")
            .await
            .map_err(|e| LoaderError::StatementExecution(format!("COMMIT failed: {e}")))?;
        Ok(())
    }

    async fn rollback(&mut self) -> LoaderResult<()> {
        (&mut self.conn)
            .execute("ROLLBACK")
            .await
            .map_err(|e| LoaderError::Connection(format!("ROLLBACK failed: {e}")))?;
        Ok(())
    }

    async fn close(self) -> LoaderResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| LoaderError::Connection(format!("Failed to close connection: {e}")))?;
        tracing::debug!("MySQL connection closed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
