//! Batch execution of loaded scripts against one database session.
//!
//! Files run in [`FileContentMap`] order (sorted by path). Every non-blank
//! statement is executed and committed on its own. The first failure, in
//! splitting, executing or committing, stops the whole batch: remaining
//! statements and files are skipped and the session is rolled back once.
//! The failure is reported in the returned [`BatchReport`], not as an `Err`.

use crate::error::{LoaderError, LoaderResult};
use crate::session::DatabaseSession;
use crate::splitter::StatementSplitter;
use crate::types::{ExecutionResult, FileContentMap};

/// How the batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every statement of every file was executed and committed.
    Completed,
    /// Execution stopped at `statement` of `file` and the session was rolled back.
    ///
    /// `statement` is `None` when the file could not be split.
    FailedAt {
        file: String,
        statement: Option<String>,
        error: String,
    },
}

/// Summary of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub outcome: BatchOutcome,
    /// Statements executed and committed before the batch ended.
    pub statements_committed: usize,
    /// Files whose statements all committed.
    pub files_completed: usize,
}

impl BatchReport {
    /// `0` on success, `1` after a failure (execution is fail-fast).
    pub fn error_count(&self) -> usize {
        match self.outcome {
            BatchOutcome::Completed => 0,
            BatchOutcome::FailedAt { .. } => 1,
        }
    }

    pub fn last_failed_file(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Completed => None,
            BatchOutcome::FailedAt { file, .. } => Some(file),
        }
    }

    pub fn last_failed_statement(&self) -> Option<&str> {
        match &self.outcome {
            BatchOutcome::Completed => None,
            BatchOutcome::FailedAt { statement, .. } => statement.as_deref(),
        }
    }

    pub fn to_execution_result(&self) -> ExecutionResult {
        ExecutionResult::loaded(self.error_count())
    }
}

/// Where the batch stopped.
struct Failure {
    file: String,
    statement: Option<String>,
    error: LoaderError,
}

/// Runs a [`FileContentMap`] through a [`DatabaseSession`].
pub struct BatchExecutor<'a> {
    splitter: &'a dyn StatementSplitter,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(splitter: &'a dyn StatementSplitter) -> Self {
        Self { splitter }
    }

    /// Execute every statement of every file.
    ///
    /// Only a failing rollback is returned as `Err`; statement failures are
    /// reported through [`BatchOutcome::FailedAt`].
    pub async fn run<S>(&self, session: &mut S, files: &FileContentMap) -> LoaderResult<BatchReport>
    where
        S: DatabaseSession + ?Sized,
    {
        let mut statements_committed = 0;
        let mut files_completed = 0;

        let failure = self
            .execute_files(session, files, &mut statements_committed, &mut files_completed)
            .await;

        let outcome = match failure {
            None => BatchOutcome::Completed,
            Some(Failure {
                file,
                statement,
                error,
            }) => {
                tracing::error!(file = %file, error = %error, "Error executing script");
                if let Some(statement) = &statement {
                    tracing::error!(statement = %statement, "Failing SQL statement");
                }
                session.rollback().await?;
                tracing::warn!(file = %file, "Session rolled back");
                BatchOutcome::FailedAt {
                    file,
                    statement,
                    error: error.to_string(),
                }
            }
        };

        Ok(BatchReport {
            outcome,
            statements_committed,
            files_completed,
        })
    }

    async fn execute_files<S>(
        &self,
        session: &mut S,
        files: &FileContentMap,
        statements_committed: &mut usize,
        files_completed: &mut usize,
    ) -> Option<Failure>
    where
        S: DatabaseSession + ?Sized,
    {
        for (path, content) in files {
            let candidates = match self.splitter.split(content) {
                Ok(candidates) => candidates,
                Err(error) => {
                    return Some(Failure {
                        file: path.clone(),
                        statement: None,
                        error,
                    })
                }
            };

            for candidate in candidates {
                let statement = candidate.trim();
                if statement.is_empty() {
                    continue;
                }
                let result = match session.execute(statement).await {
                    Ok(()) => session.commit().await,
                    Err(e) => Err(e),
                };
                if let Err(error) = result {
                    return Some(Failure {
                        file: path.clone(),
                        statement: Some(statement.to_string()),
                        error,
                    });
                }
                *statements_committed += 1;
            }

            *files_completed += 1;
            tracing::info!(file = %path, "Script executed successfully");
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
