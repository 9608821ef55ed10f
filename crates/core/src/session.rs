//! Database session contract.
//!
//! A session wraps exactly one connection with autocommit disabled, so
//! every `commit` and `rollback` is caller-driven.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::LoaderConfig;
use crate::error::LoaderResult;
use crate::types::Secret;

/// Where to connect; credentials travel separately as a [`Secret`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub connect_timeout: Duration,
}

impl ConnectParams {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            host: config.db_host.clone(),
            port: config.db_port,
            database: config.db_name.clone(),
            connect_timeout: config.connect_timeout,
        }
    }
}

/// One open database connection.
#[async_trait]
pub trait DatabaseSession: Send {
    /// Run a single plain-text statement (no parameter binding).
    async fn execute(&mut self, statement: &str) -> LoaderResult<()>;

    async fn commit(&mut self) -> LoaderResult<()>;

    async fn rollback(&mut self) -> LoaderResult<()>;

    /// Release the connection.
    async fn close(self) -> LoaderResult<()>
    where
        Self: Sized;
}

/// Opens [`DatabaseSession`]s.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    type Session: DatabaseSession;

    /// Establish one connection. Timeouts and authentication rejections
    /// surface as [`LoaderError::Connection`](crate::error::LoaderError::Connection);
    /// there is no retry.
    async fn open(&self, params: &ConnectParams, secret: &Secret) -> LoaderResult<Self::Session>;
}
