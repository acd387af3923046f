//! In-memory backend implementing every backend port.
//!
//! One [`MemoryBackend`] plays identity provider, document store and blob
//! store at once. Clones share the same data. Tests can queue failures per
//! operation and inspect the call log.

mod assets;
mod documents;
mod identity;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::domain::ports::BackendError;
use crate::domain::{EmailAddress, Project, ProjectId, UserId, UserProfile};

/// Default base URI for uploaded assets.
pub const DEFAULT_ASSET_BASE_URL: &str = "memory://assets";
/// Default upload chunk used to pace progress events.
pub const DEFAULT_UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Backend verbs, used for failure injection and the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    CreateIdentity,
    Authenticate,
    SignOut,
    PasswordReset,
    ReadProfile,
    WriteProfile,
    ListProjects,
    ListProjectsByOwner,
    CreateProject,
    ReplaceProject,
    DeleteProject,
    SetLikeMembership,
    Upload,
}

#[derive(Debug)]
struct Account {
    user_id: UserId,
    password: String,
}

#[derive(Debug, Default)]
struct BackendData {
    accounts: HashMap<String, Account>,
    profiles: HashMap<UserId, UserProfile>,
    projects: BTreeMap<ProjectId, Project>,
    assets: HashMap<String, Vec<u8>>,
    password_resets: Vec<EmailAddress>,
    failures: HashMap<BackendOperation, VecDeque<BackendError>>,
    calls: Vec<BackendOperation>,
}

/// Shared in-memory backend.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<Mutex<BackendData>>,
    identity: Arc<watch::Sender<Option<UserId>>>,
    asset_base_url: String,
    upload_chunk_bytes: usize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (identity, _receiver) = watch::channel(None);
        Self {
            data: Arc::new(Mutex::new(BackendData::default())),
            identity: Arc::new(identity),
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_owned(),
            upload_chunk_bytes: DEFAULT_UPLOAD_CHUNK_BYTES,
        }
    }

    /// Override the base URI returned for uploaded assets.
    pub fn with_asset_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.asset_base_url = base_url.into();
        self
    }

    /// Override the chunk size that paces upload progress.
    pub fn with_upload_chunk_bytes(mut self, chunk: usize) -> Self {
        self.upload_chunk_bytes = chunk.max(1);
        self
    }

    /// Make the next call to `operation` fail with `error`.
    ///
    /// Failures queue up; each call consumes one.
    pub fn fail_next(&self, operation: BackendOperation, error: BackendError) {
        if let Ok(mut data) = self.lock() {
            data.failures.entry(operation).or_default().push_back(error);
        }
    }

    /// Every operation invoked so far, in order.
    pub fn calls(&self) -> Vec<BackendOperation> {
        self.lock().map(|data| data.calls.clone()).unwrap_or_default()
    }

    /// Number of times `operation` has been invoked.
    pub fn call_count(&self, operation: BackendOperation) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call == operation)
            .count()
    }

    /// Register an account with a stored profile, bypassing the call log.
    pub fn seed_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserId, BackendError> {
        let mut data = self.lock()?;
        let user_id = data.insert_account(email, password)?;
        data.profiles.insert(
            user_id.clone(),
            UserProfile::new(user_id.clone(), name, email.trim()),
        );
        Ok(user_id)
    }

    /// Store a project directly, bypassing the call log.
    pub fn seed_project(&self, project: Project) -> Result<ProjectId, BackendError> {
        let mut data = self.lock()?;
        Ok(data.insert_project(project))
    }

    /// Current stored copy of a project.
    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.lock().ok()?.projects.get(id).cloned()
    }

    /// Bytes stored under an upload URI.
    pub fn asset(&self, uri: &str) -> Option<Vec<u8>> {
        self.lock().ok()?.assets.get(uri).cloned()
    }

    /// Emails that requested a password reset.
    pub fn password_resets(&self) -> Vec<EmailAddress> {
        self.lock()
            .map(|data| data.password_resets.clone())
            .unwrap_or_default()
    }

    /// Identity currently holding a backend credential.
    pub fn current_identity(&self) -> Option<UserId> {
        self.identity.borrow().clone()
    }

    /// Pretend a credential for `user_id` survived from an earlier run.
    pub fn set_current_identity(&self, user_id: Option<UserId>) {
        self.identity.send_replace(user_id);
    }

    fn lock(&self) -> Result<MutexGuard<'_, BackendData>, BackendError> {
        self.data
            .lock()
            .map_err(|_| BackendError::unavailable("memory backend lock poisoned"))
    }

    /// Record `operation`, apply any queued failure, then run `f`.
    fn with_data<T>(
        &self,
        operation: BackendOperation,
        f: impl FnOnce(&mut BackendData) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut data = self.lock()?;
        data.calls.push(operation);
        if let Some(error) = data
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        f(&mut data)
    }
}

impl BackendData {
    fn insert_account(&mut self, email: &str, password: &str) -> Result<UserId, BackendError> {
        let key = email.trim().to_ascii_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(BackendError::email_in_use(
                "Firebase: Error (auth/email-already-in-use).",
            ));
        }
        let user_id = new_user_id()?;
        self.accounts.insert(
            key,
            Account {
                user_id: user_id.clone(),
                password: password.to_owned(),
            },
        );
        Ok(user_id)
    }

    fn insert_project(&mut self, mut project: Project) -> ProjectId {
        let id = project
            .id
            .clone()
            .unwrap_or_else(|| ProjectId::new(uuid::Uuid::new_v4().simple().to_string()));
        project.id = Some(id.clone());
        self.projects.insert(id.clone(), project);
        id
    }
}

fn new_user_id() -> Result<UserId, BackendError> {
    UserId::new(uuid::Uuid::new_v4().simple().to_string())
        .map_err(|error| BackendError::other("internal", error.to_string()))
}
