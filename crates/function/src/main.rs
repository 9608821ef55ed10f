//! `scriptdeploy-function` -- applies repository SQL scripts to MySQL.
//!
//! Runs under the Lambda runtime. Each invocation resolves database
//! credentials, loads every script under the configured repository folder,
//! and executes the statements one by one, returning
//! `{"statusCode": 200, "body": "..."}`.
//!
//! Configuration comes from the environment; see
//! [`LoaderConfig::from_env`](scriptdeploy_core::LoaderConfig::from_env).

use anyhow::Context;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use scriptdeploy_core::LoaderConfig;
use scriptdeploy_function::{telemetry, FunctionContext};

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = LoaderConfig::from_env().context("Failed to load configuration")?;
    let sdk_config = scriptdeploy_cloud::load_sdk_config().await;
    let ctx = FunctionContext::new(config, &sdk_config);
    tracing::info!(
        repository = %ctx.config().repository,
        branch = %ctx.config().branch,
        "scriptdeploy-function ready"
    );

    let ctx = &ctx;
    run(service_fn(move |event: LambdaEvent<serde_json::Value>| async move {
        ctx.handle(event).await
    }))
    .await
}
