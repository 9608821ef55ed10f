//! AWS CodeCommit repository service.
//!
//! Maps `GetBranch`, `GetFolder` and `GetFile` onto [`RepositoryService`].
//! "Does not exist" exceptions become the matching not-found variants of
//! [`LoaderError`]; everything else is a [`LoaderError::Repository`].

use async_trait::async_trait;
use aws_sdk_codecommit::error::DisplayErrorContext;
use aws_sdk_codecommit::operation::get_branch::GetBranchError;
use aws_sdk_codecommit::operation::get_file::GetFileError;
use aws_sdk_codecommit::operation::get_folder::GetFolderError;
use aws_sdk_codecommit::Client;
use scriptdeploy_core::{LoaderError, LoaderResult, RepositoryService};

/// [`RepositoryService`] backed by the CodeCommit API.
pub struct CodeCommitRepository {
    client: Client,
}

impl CodeCommitRepository {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl RepositoryService for CodeCommitRepository {
    async fn get_branch(&self, repository: &str, branch: &str) -> LoaderResult<String> {
        let output = self
            .client
            .get_branch()
            .repository_name(repository)
            .branch_name(branch)
            .send()
            .await
            .map_err(|e| classify_get_branch(e.into_service_error(), repository, branch))?;

        output
            .branch()
            .and_then(|b| b.commit_id())
            .map(str::to_string)
            .ok_or_else(|| {
                LoaderError::Repository(format!(
                    "GetBranch returned no commit id for '{branch}' in '{repository}'"
                ))
            })
    }

    async fn get_folder(
        &self,
        repository: &str,
        folder_path: &str,
        commit_id: &str,
    ) -> LoaderResult<Vec<String>> {
        let output = self
            .client
            .get_folder()
            .repository_name(repository)
            .folder_path(folder_path)
            .commit_specifier(commit_id)
            .send()
            .await
            .map_err(|e| classify_get_folder(e.into_service_error(), folder_path, commit_id))?;

        Ok(output
            .files()
            .iter()
            .filter_map(|f| f.absolute_path().map(str::to_string))
            .collect())
    }

    async fn get_file(
        &self,
        repository: &str,
        commit_specifier: &str,
        path: &str,
    ) -> LoaderResult<Vec<u8>> {
        let output = self
            .client
            .get_file()
            .repository_name(repository)
            .commit_specifier(commit_specifier)
            .file_path(path)
            .send()
            .await
            .map_err(|e| classify_get_file(e.into_service_error(), path, commit_specifier))?;

        Ok(output.file_content.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

fn classify_get_branch(err: GetBranchError, repository: &str, branch: &str) -> LoaderError {
    if err.is_branch_does_not_exist_exception() {
        LoaderError::BranchNotFound {
            repository: repository.to_string(),
            branch: branch.to_string(),
        }
    } else {
        LoaderError::Repository(format!("GetBranch failed: {}", DisplayErrorContext(&err)))
    }
}

fn classify_get_folder(err: GetFolderError, folder_path: &str, commit_id: &str) -> LoaderError {
    if err.is_folder_does_not_exist_exception() {
        LoaderError::FolderNotFound {
            folder_path: folder_path.to_string(),
            commit_id: commit_id.to_string(),
        }
    } else {
        LoaderError::Repository(format!("GetFolder failed: {}", DisplayErrorContext(&err)))
    }
}

fn classify_get_file(err: GetFileError, path: &str, reference: &str) -> LoaderError {
    if err.is_file_does_not_exist_exception() {
        LoaderError::FileNotFound {
            path: path.to_string(),
            reference: reference.to_string(),
        }
    } else {
        LoaderError::Repository(format!("GetFile failed: {}", DisplayErrorContext(&err)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use aws_sdk_codecommit::types::error::{
        BranchDoesNotExistException, FileDoesNotExistException, FileTooLargeException,
        FolderDoesNotExistException, RepositoryDoesNotExistException,
    };

    use super::*;

    #[test]
    fn missing_branch_is_branch_not_found() {
        let err = GetBranchError::BranchDoesNotExistException(
            BranchDoesNotExistException::builder()
                .message("Branch does not exist")
                .build(),
        );
        assert_matches!(
            classify_get_branch(err, "SourceRDS", "release"),
            LoaderError::BranchNotFound { repository, branch }
                if repository == "SourceRDS" && branch == "release"
        );
    }

    #[test]
    fn missing_repository_is_repository_error() {
        let err = GetBranchError::RepositoryDoesNotExistException(
            RepositoryDoesNotExistException::builder()
                .message("SourceRDS does not exist")
                .build(),
        );
        assert_matches!(
            classify_get_branch(err, "SourceRDS", "master"),
            LoaderError::Repository(msg) if msg.contains("GetBranch")
        );
    }

    #[test]
    fn missing_folder_is_folder_not_found() {
        let err = GetFolderError::FolderDoesNotExistException(
            FolderDoesNotExistException::builder().build(),
        );
        assert_matches!(
            classify_get_folder(err, "SQL", "4f1c2d9"),
            LoaderError::FolderNotFound { folder_path, commit_id }
                if folder_path == "SQL" && commit_id == "4f1c2d9"
        );
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = GetFileError::FileDoesNotExistException(FileDoesNotExistException::builder().build());
        assert_matches!(
            classify_get_file(err, "SQL/a.sql", "master"),
            LoaderError::FileNotFound { path, reference } if path == "SQL/a.sql" && reference == "master"
        );
    }

    #[test]
    fn oversized_file_is_repository_error() {
        let err = GetFileError::FileTooLargeException(FileTooLargeException::builder().build());
        assert_matches!(
            classify_get_file(err, "SQL/dump.sql", "master"),
            LoaderError::Repository(_)
        );
    }
}
