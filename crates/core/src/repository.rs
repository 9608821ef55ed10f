//! Read access to the version-control repository service.
//!
//! [`RepositoryService`] is the raw request/response contract of the backing
//! service. [`RepositoryReader`] binds it to one repository and adds UTF-8
//! decoding of file content.

use async_trait::async_trait;

use crate::error::{LoaderError, LoaderResult};
use crate::types::RepositoryFile;

/// Raw repository service calls.
///
/// Implementations map "does not exist" responses onto
/// [`LoaderError::BranchNotFound`], [`LoaderError::FolderNotFound`] and
/// [`LoaderError::FileNotFound`]; anything else becomes
/// [`LoaderError::Repository`].
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// Commit id at the head of `branch`.
    async fn get_branch(&self, repository: &str, branch: &str) -> LoaderResult<String>;

    /// Absolute paths of the files directly under `folder_path` at `commit_id`.
    async fn get_folder(
        &self,
        repository: &str,
        folder_path: &str,
        commit_id: &str,
    ) -> LoaderResult<Vec<String>>;

    /// Raw bytes of `path` at `commit_specifier` (a commit id or branch name).
    async fn get_file(
        &self,
        repository: &str,
        commit_specifier: &str,
        path: &str,
    ) -> LoaderResult<Vec<u8>>;
}

/// A [`RepositoryService`] bound to a single repository.
pub struct RepositoryReader<'a> {
    service: &'a dyn RepositoryService,
    repository: String,
}

impl<'a> RepositoryReader<'a> {
    pub fn new(service: &'a dyn RepositoryService, repository: impl Into<String>) -> Self {
        Self {
            service,
            repository: repository.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Resolve `branch` to its head commit.
    pub async fn resolve_branch_head(&self, branch: &str) -> LoaderResult<String> {
        let commit_id = self.service.get_branch(&self.repository, branch).await?;
        tracing::debug!(
            repository = %self.repository,
            branch,
            commit_id = %commit_id,
            "Resolved branch head"
        );
        Ok(commit_id)
    }

    /// List the files directly under `folder_path` at `commit_id`.
    pub async fn list_files(&self, commit_id: &str, folder_path: &str) -> LoaderResult<Vec<String>> {
        self.service
            .get_folder(&self.repository, folder_path, commit_id)
            .await
    }

    /// Fetch `path` at `reference` and decode it as UTF-8.
    pub async fn get_file_content(&self, reference: &str, path: &str) -> LoaderResult<RepositoryFile> {
        let bytes = self
            .service
            .get_file(&self.repository, reference, path)
            .await?;
        let content = decode_content(path, bytes)?;
        Ok(RepositoryFile {
            path: path.to_string(),
            content,
        })
    }
}

/// Decode file bytes as UTF-8 without any lossy replacement.
pub fn decode_content(path: &str, bytes: Vec<u8>) -> LoaderResult<String> {
    String::from_utf8(bytes).map_err(|e| LoaderError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
