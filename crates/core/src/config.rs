//! Deployment configuration.
//!
//! The six identifiers that select *what* to deploy and *where* have no
//! defaults; a missing value fails the invocation before any service is
//! contacted. Tuning knobs fall back to the defaults below.

use std::time::Duration;

use crate::error::{LoaderError, LoaderResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default MySQL port.
pub const DEFAULT_DB_PORT: u16 = 3306;

/// Default connect timeout for the database session.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default statement delimiter.
pub const DEFAULT_DELIMITER: char = ';';

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which statement-boundary detector the batch executor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitterKind {
    /// Split on every occurrence of the delimiter character.
    #[default]
    Naive,
    /// Split on top-level semicolons only, using the MySQL tokenizer.
    SqlAware,
}

impl SplitterKind {
    /// Parse from the `SQL_SPLITTER` value.
    pub fn from_name(name: &str) -> LoaderResult<Self> {
        match name {
            "naive" => Ok(Self::Naive),
            "sql-aware" => Ok(Self::SqlAware),
            other => Err(LoaderError::Config(format!(
                "Unknown splitter '{other}'. Must be one of: naive, sql-aware"
            ))),
        }
    }
}

/// Optional S3 mirror of the loaded scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub bucket: String,
    /// Prepended verbatim to each repository path.
    pub key_prefix: String,
}

/// Everything one invocation needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Repository holding the SQL scripts.
    pub repository: String,
    /// Branch whose head is listed.
    pub branch: String,
    /// Folder (relative to the repository root) containing the scripts.
    pub folder_path: String,
    /// Secret store identifier for the database credentials.
    pub secret_id: String,
    /// Region override for the secret store request.
    pub secret_region: Option<String>,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub connect_timeout: Duration,
    pub delimiter: char,
    pub splitter: SplitterKind,
    pub archive: Option<ArchiveConfig>,
}

impl LoaderConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env var                   | Required | Default        |
    /// |---------------------------|----------|----------------|
    /// | `SCRIPT_REPOSITORY`       | yes      | --             |
    /// | `SCRIPT_BRANCH`           | yes      | --             |
    /// | `SCRIPT_FOLDER`           | yes      | --             |
    /// | `DB_SECRET_ID`            | yes      | --             |
    /// | `DB_HOST`                 | yes      | --             |
    /// | `DB_NAME`                 | yes      | --             |
    /// | `DB_SECRET_REGION`        | no       | SDK region     |
    /// | `DB_PORT`                 | no       | `3306`         |
    /// | `DB_CONNECT_TIMEOUT_SECS` | no       | `5`            |
    /// | `SQL_DELIMITER`           | no       | `;`            |
    /// | `SQL_SPLITTER`            | no       | `naive`        |
    /// | `ARCHIVE_BUCKET`          | no       | archive off    |
    /// | `ARCHIVE_KEY_PREFIX`      | no       | empty          |
    pub fn from_env() -> LoaderResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> LoaderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| {
            get(key).ok_or_else(|| LoaderError::Config(format!("{key} must be set")))
        };

        let db_port = match get("DB_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| LoaderError::Config(format!("DB_PORT must be a valid u16, got '{raw}'")))?,
            None => DEFAULT_DB_PORT,
        };

        let connect_timeout_secs = match get("DB_CONNECT_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                LoaderError::Config(format!(
                    "DB_CONNECT_TIMEOUT_SECS must be a valid u64, got '{raw}'"
                ))
            })?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        let delimiter = match get("SQL_DELIMITER") {
            Some(raw) => {
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(LoaderError::Config(format!(
                            "SQL_DELIMITER must be a single character, got '{raw}'"
                        )))
                    }
                }
            }
            None => DEFAULT_DELIMITER,
        };

        let splitter = match get("SQL_SPLITTER") {
            Some(raw) => SplitterKind::from_name(&raw)?,
            None => SplitterKind::default(),
        };

        let archive = get("ARCHIVE_BUCKET").map(|bucket| ArchiveConfig {
            bucket,
            key_prefix: get("ARCHIVE_KEY_PREFIX").unwrap_or_default(),
        });

        let config = Self {
            repository: require("SCRIPT_REPOSITORY")?,
            branch: require("SCRIPT_BRANCH")?,
            folder_path: require("SCRIPT_FOLDER")?,
            secret_id: require("DB_SECRET_ID")?,
            secret_region: get("DB_SECRET_REGION"),
            db_host: require("DB_HOST")?,
            db_port,
            db_name: require("DB_NAME")?,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            delimiter,
            splitter,
            archive,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the executor cannot honour.
    pub fn validate(&self) -> LoaderResult<()> {
        if self.splitter == SplitterKind::SqlAware && self.delimiter != ';' {
            return Err(LoaderError::Config(format!(
                "sql-aware splitter only supports ';' as delimiter, got '{}'",
                self.delimiter
            )));
        }
        if self.connect_timeout.is_zero() {
            return Err(LoaderError::Config(
                "DB_CONNECT_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
