//! AWS implementations of the deployment collaborators.
//!
//! - [`SecretsManagerStore`] — credentials from AWS Secrets Manager.
//! - [`CodeCommitRepository`] — script files from AWS CodeCommit.
//! - [`S3ScriptArchive`] — optional mirror of loaded scripts into S3.
//!
//! All clients are built from one shared [`aws_config::SdkConfig`].

pub mod codecommit;
pub mod s3;
pub mod secrets;

pub use codecommit::CodeCommitRepository;
pub use s3::S3ScriptArchive;
pub use secrets::SecretsManagerStore;

/// Load the ambient AWS configuration (environment, profile, or the
/// Lambda execution role).
pub async fn load_sdk_config() -> aws_config::SdkConfig {
    aws_config::load_from_env().await
}
