//! AWS Secrets Manager secret store.

use async_trait::async_trait;
use aws_sdk_secretsmanager::config::{Builder, Region};
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use scriptdeploy_core::{LoaderError, LoaderResult, SecretPayload, SecretStore};

/// [`SecretStore`] backed by Secrets Manager `GetSecretValue`.
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    /// Build a client from the shared SDK config, optionally pinned to
    /// another region than the ambient one.
    pub fn new(sdk_config: &aws_config::SdkConfig, region: Option<&str>) -> Self {
        let mut builder = Builder::from(sdk_config);
        if let Some(region) = region {
            builder = builder.region(Region::new(region.to_string()));
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Region requests are sent to.
    pub fn region(&self) -> Option<&Region> {
        self.client.config().region()
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get_secret_value(&self, secret_id: &str) -> LoaderResult<SecretPayload> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                tracing::error!(secret_id, error = %message, "GetSecretValue failed");
                LoaderError::SecretAccess {
                    secret_id: secret_id.to_string(),
                    message,
                }
            })?;

        tracing::debug!(
            secret_id,
            version_id = output.version_id().unwrap_or("-"),
            "Fetched secret value"
        );

        payload_from_parts(
            output.secret_string(),
            output.secret_binary().map(|b| b.as_ref()),
        )
        .ok_or_else(|| LoaderError::MalformedSecret(format!("secret '{secret_id}' has no value")))
    }
}

/// Text wins over binary, matching `GetSecretValue` semantics where only
/// one of the two is populated.
fn payload_from_parts(text: Option<&str>, binary: Option<&[u8]>) -> Option<SecretPayload> {
    match (text, binary) {
        (Some(text), _) => Some(SecretPayload::Text(text.to_string())),
        (None, Some(bytes)) => Some(SecretPayload::Binary(bytes.to_vec())),
        (None, None) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
