//! Optional mirror of the loaded scripts into an object store.

use async_trait::async_trait;

use crate::config::ArchiveConfig;
use crate::error::LoaderResult;
use crate::types::FileContentMap;

/// Write access to an object-store bucket.
#[async_trait]
pub trait ScriptArchive: Send + Sync {
    /// Store `content` under `key`, replacing any existing object.
    async fn put_script(&self, key: &str, content: &str) -> LoaderResult<()>;
}

/// Object key for a repository path: the prefix followed by the path
/// without any leading `/`.
pub fn archive_key(key_prefix: &str, path: &str) -> String {
    format!("{key_prefix}{}", path.trim_start_matches('/'))
}

/// Upload every file in `files`, stopping at the first failure.
///
/// Returns the number of objects written.
pub async fn archive_all(
    archive: &dyn ScriptArchive,
    config: &ArchiveConfig,
    files: &FileContentMap,
) -> LoaderResult<usize> {
    for (path, content) in files {
        let key = archive_key(&config.key_prefix, path);
        archive.put_script(&key, content).await?;
        tracing::debug!(bucket = %config.bucket, key = %key, "Archived script");
    }
    tracing::info!(bucket = %config.bucket, count = files.len(), "Archived scripts");
    Ok(files.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
