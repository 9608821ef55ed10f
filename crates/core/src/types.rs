//! Invocation-scoped data carried between pipeline stages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP-style status returned by every completed invocation.
pub const STATUS_OK: u16 = 200;

/// Database credentials resolved from the secret store.
///
/// Lives only for one invocation and is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    pub username: String,
    pub password: String,
}

impl Secret {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A single file fetched from the repository service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFile {
    /// Absolute path inside the repository (unique within a listing).
    pub path: String,
    /// UTF-8 decoded file content.
    pub content: String,
}

/// File path to file text, iterated in path order.
pub type FileContentMap = BTreeMap<String, String>;

/// Payload handed back to the invocation harness.
///
/// Serializes as `{"statusCode": 200, "body": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub status_code: u16,
    pub body: String,
}

impl ExecutionResult {
    /// Build the summary returned after a batch run.
    ///
    /// The status is always [`STATUS_OK`], including after a rolled-back
    /// batch; only `body` carries the error count.
    pub fn loaded(error_count: usize) -> Self {
        Self {
            status_code: STATUS_OK,
            body: format!("Database file loaded into RDS MySQL with {error_count} errors"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
