//! S3 mirror for loaded scripts.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use scriptdeploy_core::{LoaderError, LoaderResult, ScriptArchive};

/// Content type stored on mirrored scripts.
const SCRIPT_CONTENT_TYPE: &str = "application/sql";

/// [`ScriptArchive`] writing one object per script into a bucket.
pub struct S3ScriptArchive {
    client: Client,
    bucket: String,
}

impl S3ScriptArchive {
    pub fn new(sdk_config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ScriptArchive for S3ScriptArchive {
    async fn put_script(&self, key: &str, content: &str) -> LoaderResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(SCRIPT_CONTENT_TYPE)
            .body(ByteStream::from(content.as_bytes().to_vec()))
            .send()
            .await
            .map_err(|e| {
                LoaderError::Archive(format!(
                    "PutObject s3://{}/{key} failed: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}
