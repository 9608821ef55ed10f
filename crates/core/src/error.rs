/// Every failure the deployment pipeline can surface.
///
/// Statement-level failures inside the batch executor are caught and turned
/// into a [`BatchOutcome::FailedAt`](crate::executor::BatchOutcome); every
/// other variant propagates to the invocation harness.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Secret access failed for '{secret_id}': {message}")]
    SecretAccess { secret_id: String, message: String },

    #[error("Malformed secret: {0}")]
    MalformedSecret(String),

    #[error("Secret is missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Branch '{branch}' not found in repository '{repository}'")]
    BranchNotFound { repository: String, branch: String },

    #[error("Folder '{folder_path}' not found at commit {commit_id}")]
    FolderNotFound {
        folder_path: String,
        commit_id: String,
    },

    #[error("File '{path}' not found at '{reference}'")]
    FileNotFound { path: String, reference: String },

    #[error("File '{path}' is not valid UTF-8: {message}")]
    Decode { path: String, message: String },

    #[error("Statement execution failed: {0}")]
    StatementExecution(String),

    #[error("Statement splitting failed: {0}")]
    StatementSplit(String),

    #[error("Repository service error: {0}")]
    Repository(String),

    #[error("Script archive error: {0}")]
    Archive(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias used across the crate.
pub type LoaderResult<T> = Result<T, LoaderError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_branch_not_found() {
        let err = LoaderError::BranchNotFound {
            repository: "SourceRDS".to_string(),
            branch: "release".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Branch 'release' not found in repository 'SourceRDS'"
        );
    }

    #[test]
    fn display_missing_key() {
        let err = LoaderError::MissingKey("password");
        assert_eq!(err.to_string(), "Secret is missing required key 'password'");
    }

    #[test]
    fn display_secret_access_does_not_leak_payload() {
        let err = LoaderError::SecretAccess {
            secret_id: "/db/creds".to_string(),
            message: "AccessDeniedException".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Secret access failed for '/db/creds': AccessDeniedException"
        );
    }
}
