//! Repository-to-database script deployment.
//!
//! This crate holds the pipeline that runs once per invocation:
//!
//! - [`credentials`] resolves database credentials from a [`SecretStore`].
//! - [`repository`] and [`loader`] turn a repository folder into a
//!   [`FileContentMap`].
//! - [`archive`] optionally mirrors the loaded scripts into an object store.
//! - [`splitter`] and [`executor`] apply the scripts statement by statement
//!   over a single [`DatabaseSession`].
//! - [`pipeline`] wires the steps together in a fixed order.
//!
//! Every external service sits behind a trait; the concrete AWS and MySQL
//! implementations live in the `cloud` and `db` crates.

pub mod archive;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod loader;
pub mod pipeline;
pub mod repository;
pub mod session;
pub mod splitter;
pub mod types;

pub use archive::ScriptArchive;
pub use config::{ArchiveConfig, LoaderConfig, SplitterKind};
pub use credentials::{SecretPayload, SecretStore};
pub use error::{LoaderError, LoaderResult};
pub use executor::{BatchExecutor, BatchOutcome, BatchReport};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput, Stage};
pub use repository::RepositoryService;
pub use session::{ConnectParams, DatabaseSession, SessionConnector};
pub use types::{ExecutionResult, FileContentMap, RepositoryFile, Secret};
