//! The deployment pipeline run once per invocation.
//!
//! ```text
//! Init -> SecretResolved -> DbConnected -> RepoConnected -> FilesListed
//!      -> FilesLoaded [-> FilesArchived] -> Executed -> Done
//! ```
//!
//! Any error before `Executed` ends the run with a [`PipelineError`] naming
//! the last state reached. Statement failures do not: they are reported in
//! the [`ExecutionResult`] body with status 200. The database session is
//! closed on every path once it has been opened.

use std::fmt;

use crate::archive::{self, ScriptArchive};
use crate::config::LoaderConfig;
use crate::credentials::{CredentialResolver, SecretStore};
use crate::error::LoaderError;
use crate::executor::{BatchExecutor, BatchReport};
use crate::loader::ScriptLoader;
use crate::repository::{RepositoryReader, RepositoryService};
use crate::session::{ConnectParams, DatabaseSession, SessionConnector};
use crate::splitter;
use crate::types::ExecutionResult;

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SecretResolved,
    DbConnected,
    RepoConnected,
    FilesListed,
    FilesLoaded,
    FilesArchived,
    Executed,
    Done,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SecretResolved => "secret_resolved",
            Self::DbConnected => "db_connected",
            Self::RepoConnected => "repo_connected",
            Self::FilesListed => "files_listed",
            Self::FilesLoaded => "files_loaded",
            Self::FilesArchived => "files_archived",
            Self::Executed => "executed",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A run that ended in the `Failed` state.
#[derive(Debug, thiserror::Error)]
#[error("Pipeline failed after stage '{stage}': {source}")]
pub struct PipelineError {
    /// Last state reached before the failure.
    pub stage: Stage,
    #[source]
    pub source: LoaderError,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub result: ExecutionResult,
    pub report: BatchReport,
    pub files_loaded: usize,
}

/// Tracks the current [`Stage`] and tags errors with it.
struct Progress {
    stage: Stage,
}

impl Progress {
    fn advance(&mut self, stage: Stage) {
        self.stage = stage;
        tracing::info!(stage = %stage, "Pipeline stage reached");
    }

    fn fail(&self, source: LoaderError) -> PipelineError {
        tracing::error!(stage = %self.stage, error = %source, "Pipeline failed");
        PipelineError {
            stage: self.stage,
            source,
        }
    }
}

/// External collaborators of one run.
pub struct Pipeline<'a, C: SessionConnector> {
    secrets: &'a dyn SecretStore,
    connector: &'a C,
    repository: &'a dyn RepositoryService,
    archive: Option<&'a dyn ScriptArchive>,
}

impl<'a, C: SessionConnector> Pipeline<'a, C> {
    pub fn new(
        secrets: &'a dyn SecretStore,
        connector: &'a C,
        repository: &'a dyn RepositoryService,
    ) -> Self {
        Self {
            secrets,
            connector,
            repository,
            archive: None,
        }
    }

    /// Mirror loaded scripts into `archive`. The config must then name a
    /// bucket, and a config naming a bucket requires an attached archive.
    pub fn with_archive(mut self, archive: &'a dyn ScriptArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Run the pipeline once.
    pub async fn run(&self, config: &LoaderConfig) -> Result<PipelineOutput, PipelineError> {
        let mut progress = Progress { stage: Stage::Init };
        tracing::info!(
            repository = %config.repository,
            branch = %config.branch,
            folder_path = %config.folder_path,
            db_host = %config.db_host,
            db_name = %config.db_name,
            "Starting script deployment"
        );

        match (self.archive.is_some(), config.archive.is_some()) {
            (true, false) => {
                return Err(progress.fail(LoaderError::Config(
                    "an archive is attached but ARCHIVE_BUCKET is not set".to_string(),
                )))
            }
            (false, true) => {
                return Err(progress.fail(LoaderError::Config(
                    "ARCHIVE_BUCKET is set but no archive is attached".to_string(),
                )))
            }
            _ => {}
        }

        let secret = CredentialResolver::new(self.secrets)
            .resolve(&config.secret_id)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::SecretResolved);

        let mut session = self
            .connector
            .open(&ConnectParams::from_config(config), &secret)
            .await
            .map_err(|e| progress.fail(e))?;
        drop(secret);
        progress.advance(Stage::DbConnected);

        let outcome = self.run_with_session(&mut session, config, &mut progress).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close database session");
        }

        let output = outcome?;
        progress.advance(Stage::Done);
        Ok(output)
    }

    async fn run_with_session(
        &self,
        session: &mut C::Session,
        config: &LoaderConfig,
        progress: &mut Progress,
    ) -> Result<PipelineOutput, PipelineError> {
        let reader = RepositoryReader::new(self.repository, config.repository.as_str());
        progress.advance(Stage::RepoConnected);

        let loader = ScriptLoader::new(&reader);
        let paths = loader
            .list(&config.branch, &config.folder_path)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::FilesListed);

        let files = loader
            .fetch_all(&config.branch, &paths)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::FilesLoaded);

        if let (Some(archive), Some(archive_config)) = (self.archive, &config.archive) {
            archive::archive_all(archive, archive_config, &files)
                .await
                .map_err(|e| progress.fail(e))?;
            progress.advance(Stage::FilesArchived);
        }

        let splitter = splitter::splitter_for(config.splitter, config.delimiter);
        let report = BatchExecutor::new(splitter.as_ref())
            .run(session, &files)
            .await
            .map_err(|e| progress.fail(e))?;
        progress.advance(Stage::Executed);

        let result = report.to_execution_result();
        tracing::info!(
            status_code = result.status_code,
            statements = report.statements_committed,
            errors = report.error_count(),
            "{}",
            result.body
        );

        Ok(PipelineOutput {
            result,
            report,
            files_loaded: files.len(),
        })
    }
}
