//! Script loading: turn a repository folder into a [`FileContentMap`].
//!
//! The folder is listed at the branch's resolved head commit, but each file
//! is fetched by *branch name*. If the branch moves between the two calls,
//! the listing and the content can come from different commits.

use crate::error::LoaderResult;
use crate::repository::RepositoryReader;
use crate::types::FileContentMap;

/// Loads every script under a folder of one branch.
pub struct ScriptLoader<'a> {
    reader: &'a RepositoryReader<'a>,
}

impl<'a> ScriptLoader<'a> {
    pub fn new(reader: &'a RepositoryReader<'a>) -> Self {
        Self { reader }
    }

    /// Resolve `branch` and list the files under `folder_path` at its head.
    pub async fn list(&self, branch: &str, folder_path: &str) -> LoaderResult<Vec<String>> {
        let commit_id = self.reader.resolve_branch_head(branch).await?;
        let paths = self.reader.list_files(&commit_id, folder_path).await?;
        tracing::info!(
            repository = self.reader.repository(),
            branch,
            folder_path,
            commit_id = %commit_id,
            file_count = paths.len(),
            "Listed script files"
        );
        Ok(paths)
    }

    /// Fetch each path sequentially by branch name.
    ///
    /// The first failing fetch aborts the load; no partial map is returned.
    pub async fn fetch_all(&self, branch: &str, paths: &[String]) -> LoaderResult<FileContentMap> {
        let mut files = FileContentMap::new();
        for path in paths {
            let file = self.reader.get_file_content(branch, path).await?;
            tracing::debug!(path = %file.path, bytes = file.content.len(), "Fetched script");
            files.insert(file.path, file.content);
        }
        Ok(files)
    }

    /// [`list`](Self::list) followed by [`fetch_all`](Self::fetch_all).
    pub async fn load_all(&self, branch: &str, folder_path: &str) -> LoaderResult<FileContentMap> {
        let paths = self.list(branch, folder_path).await?;
        self.fetch_all(branch, &paths).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
