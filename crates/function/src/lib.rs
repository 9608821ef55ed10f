//! `scriptdeploy-function` library crate.
//!
//! Wires the AWS and MySQL collaborators into the deployment pipeline.
//! The Lambda entrypoint lives in `main.rs`.

pub mod handler;
pub mod telemetry;

pub use handler::FunctionContext;
