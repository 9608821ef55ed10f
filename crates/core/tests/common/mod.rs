//! In-memory collaborators shared by the pipeline integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scriptdeploy_core::{
    ArchiveConfig, ConnectParams, DatabaseSession, LoaderConfig, LoaderError, LoaderResult,
    RepositoryService, ScriptArchive, Secret, SecretPayload, SecretStore, SessionConnector,
    SplitterKind,
};

pub const COMMIT_ID: &str = "4f1c2d9";

/// Baseline configuration pointing at the fakes below.
pub fn config() -> LoaderConfig {
    LoaderConfig {
        repository: "SourceRDS".to_string(),
        branch: "master".to_string(),
        folder_path: "SQL".to_string(),
        secret_id: "/source/db/password".to_string(),
        secret_region: None,
        db_host: "db.internal".to_string(),
        db_port: 3306,
        db_name: "SourceDB".to_string(),
        connect_timeout: Duration::from_secs(5),
        delimiter: ';',
        splitter: SplitterKind::Naive,
        archive: None,
    }
}

pub fn archive_config() -> ArchiveConfig {
    ArchiveConfig {
        bucket: "build-resources".to_string(),
        key_prefix: "mirror/".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Secret store
// ---------------------------------------------------------------------------

pub struct FakeSecrets {
    pub payload: Option<SecretPayload>,
}

impl FakeSecrets {
    pub fn credentials(username: &str, password: &str) -> Self {
        let json = serde_json::json!({ "username": username, "password": password });
        Self {
            payload: Some(SecretPayload::Text(json.to_string())),
        }
    }

    pub fn denied() -> Self {
        Self { payload: None }
    }
}

#[async_trait]
impl SecretStore for FakeSecrets {
    async fn get_secret_value(&self, secret_id: &str) -> LoaderResult<SecretPayload> {
        self.payload.clone().ok_or_else(|| LoaderError::SecretAccess {
            secret_id: secret_id.to_string(),
            message: "AccessDeniedException".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Repository service
// ---------------------------------------------------------------------------

pub struct FakeRepository {
    pub branch: String,
    pub files: BTreeMap<String, String>,
    /// Paths listed in the folder but missing on fetch.
    pub dangling: Vec<String>,
}

impl FakeRepository {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        Self {
            branch: "master".to_string(),
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            dangling: Vec::new(),
        }
    }
}

#[async_trait]
impl RepositoryService for FakeRepository {
    async fn get_branch(&self, repository: &str, branch: &str) -> LoaderResult<String> {
        if branch == self.branch {
            Ok(COMMIT_ID.to_string())
        } else {
            Err(LoaderError::BranchNotFound {
                repository: repository.to_string(),
                branch: branch.to_string(),
            })
        }
    }

    async fn get_folder(
        &self,
        _repository: &str,
        folder_path: &str,
        commit_id: &str,
    ) -> LoaderResult<Vec<String>> {
        if folder_path != "SQL" || commit_id != COMMIT_ID {
            return Err(LoaderError::FolderNotFound {
                folder_path: folder_path.to_string(),
                commit_id: commit_id.to_string(),
            });
        }
        Ok(self
            .files
            .keys()
            .cloned()
            .chain(self.dangling.iter().cloned())
            .collect())
    }

    async fn get_file(
        &self,
        _repository: &str,
        commit_specifier: &str,
        path: &str,
    ) -> LoaderResult<Vec<u8>> {
        self.files
            .get(path)
            .map(|c| c.clone().into_bytes())
            .ok_or_else(|| LoaderError::FileNotFound {
                path: path.to_string(),
                reference: commit_specifier.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// Shared call log: `open`, `execute <sql>`, `commit`, `rollback`, `close`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct FakeConnector {
    pub log: CallLog,
    pub refuse: bool,
    pub fail_on: Option<String>,
    pub opened_as: Mutex<Option<String>>,
}

impl FakeConnector {
    pub fn failing_on(statement: &str) -> Self {
        Self {
            fail_on: Some(statement.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().expect("lock").clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("execute ").map(str::to_string))
            .collect()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

pub struct FakeSession {
    log: CallLog,
    fail_on: Option<String>,
}

impl FakeSession {
    fn record(&self, call: impl Into<String>) {
        self.log.lock().expect("lock").push(call.into());
    }
}

#[async_trait]
impl DatabaseSession for FakeSession {
    async fn execute(&mut self, statement: &str) -> LoaderResult<()> {
        self.record(format!("execute {statement}"));
        if self.fail_on.as_deref() == Some(statement) {
            return Err(LoaderError::StatementExecution(
                "1146 (42S02): Table 'SourceDB.missing' doesn't exist".to_string(),
            ));
        }
        Ok(())
    }

    async fn commit(&mut self) -> LoaderResult<()> {
        self.record("commit");
        Ok(())
    }

    async fn rollback(&mut self) -> LoaderResult<()> {
        self.record("rollback");
        Ok(())
    }

    async fn close(self) -> LoaderResult<()> {
        self.record("close");
        Ok(())
    }
}

#[async_trait]
impl SessionConnector for FakeConnector {
    type Session = FakeSession;

    async fn open(&self, params: &ConnectParams, secret: &Secret) -> LoaderResult<FakeSession> {
        if self.refuse {
            return Err(LoaderError::Connection(format!(
                "Access denied for user '{}'@'{}'",
                secret.username, params.host
            )));
        }
        *self.opened_as.lock().expect("lock") = Some(format!(
            "{}:{}@{}:{}/{}",
            secret.username, secret.password, params.host, params.port, params.database
        ));
        self.log.lock().expect("lock").push("open".to_string());
        Ok(FakeSession {
            log: Arc::clone(&self.log),
            fail_on: self.fail_on.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeArchive {
    pub objects: Mutex<BTreeMap<String, String>>,
    pub reject_all: bool,
}

#[async_trait]
impl ScriptArchive for FakeArchive {
    async fn put_script(&self, key: &str, content: &str) -> LoaderResult<()> {
        if self.reject_all {
            return Err(LoaderError::Archive(format!("AccessDenied writing {key}")));
        }
        self.objects
            .lock()
            .expect("lock")
            .insert(key.to_string(), content.to_string());
        Ok(())
    }
}
