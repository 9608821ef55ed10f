//! Per-invocation handler.
//!
//! AWS clients are built once per execution environment and reused across
//! invocations; the database session and everything the pipeline loads
//! live only for one invocation.

use lambda_runtime::{Error, LambdaEvent};
use scriptdeploy_cloud::{CodeCommitRepository, S3ScriptArchive, SecretsManagerStore};
use scriptdeploy_core::{ExecutionResult, LoaderConfig, Pipeline};
use scriptdeploy_db::MySqlConnector;

/// Long-lived collaborators plus the deployment configuration.
pub struct FunctionContext {
    config: LoaderConfig,
    secrets: SecretsManagerStore,
    repository: CodeCommitRepository,
    archive: Option<S3ScriptArchive>,
    connector: MySqlConnector,
}

impl FunctionContext {
    /// Build every client from the shared SDK config. The S3 client is only
    /// created when an archive bucket is configured.
    pub fn new(config: LoaderConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        let secrets = SecretsManagerStore::new(sdk_config, config.secret_region.as_deref());
        let repository = CodeCommitRepository::new(sdk_config);
        let archive = config
            .archive
            .as_ref()
            .map(|a| S3ScriptArchive::new(sdk_config, a.bucket.clone()));

        Self {
            config,
            secrets,
            repository,
            archive,
            connector: MySqlConnector,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn archive(&self) -> Option<&S3ScriptArchive> {
        self.archive.as_ref()
    }

    /// Run the pipeline once. The event payload is not inspected.
    pub async fn handle(
        &self,
        event: LambdaEvent<serde_json::Value>,
    ) -> Result<ExecutionResult, Error> {
        let (_payload, context) = event.into_parts();
        tracing::info!(request_id = %context.request_id, "Invocation received");

        let mut pipeline = Pipeline::new(&self.secrets, &self.connector, &self.repository);
        if let Some(archive) = &self.archive {
            pipeline = pipeline.with_archive(archive);
        }

        let output = pipeline.run(&self.config).await?;
        Ok(output.result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
