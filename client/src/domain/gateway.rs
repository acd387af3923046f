//! Remote data gateway: the single entry point to the external backend.
//!
//! The gateway holds no state of its own. It forwards verbs to the port
//! adapters, runs the asset pre-checks and guards upload streams.

use std::sync::Arc;

use tracing::{debug, warn};

use super::asset::{Asset, UploadError, UploadStream, guard_upload};
use super::auth::LoginCredentials;
use super::ports::{
    AssetStorage, BackendError, IdentityProvider, IdentityStream, ProfileRepository,
    ProjectRepository,
};
use super::project::{Project, ProjectId};
use super::user::{EmailAddress, UserId, UserProfile};

/// Parameter object bundling the backend port implementations.
#[derive(Clone)]
pub struct GatewayPorts {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub assets: Arc<dyn AssetStorage>,
}

/// Verb-level facade over the backend ports.
#[derive(Clone)]
pub struct RemoteGateway {
    ports: GatewayPorts,
    max_upload_bytes: usize,
}

impl RemoteGateway {
    pub fn new(ports: GatewayPorts, max_upload_bytes: usize) -> Self {
        Self {
            ports,
            max_upload_bytes,
        }
    }

    pub async fn create_identity(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<UserId, BackendError> {
        self.ports.identity.create_identity(credentials).await
    }

    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, BackendError> {
        self.ports.identity.authenticate(credentials).await
    }

    /// Drop the backend credential. Failures are logged, never returned.
    pub async fn sign_out(&self) {
        if let Err(error) = self.ports.identity.sign_out().await {
            warn!(error = %error, "backend sign-out failed");
        }
    }

    pub async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), BackendError> {
        self.ports.identity.request_password_reset(email).await
    }

    pub fn identity_changes(&self) -> IdentityStream {
        self.ports.identity.identity_changes()
    }

    pub async fn read_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        self.ports.profiles.read_profile(id).await
    }

    pub async fn write_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.ports.profiles.write_profile(profile).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>, BackendError> {
        self.ports.projects.list_projects().await
    }

    pub async fn list_projects_by_owner(&self, owner: &UserId) -> Result<Vec<Project>, BackendError> {
        self.ports.projects.list_projects_by_owner(owner).await
    }

    pub async fn create_project(&self, project: &Project) -> Result<ProjectId, BackendError> {
        self.ports.projects.create_project(project).await
    }

    pub async fn replace_project(
        &self,
        id: &ProjectId,
        project: &Project,
    ) -> Result<(), BackendError> {
        self.ports.projects.replace_project(id, project).await
    }

    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), BackendError> {
        self.ports.projects.delete_project(id).await
    }

    pub async fn set_like_membership(
        &self,
        id: &ProjectId,
        user: &UserId,
        add: bool,
    ) -> Result<(), BackendError> {
        debug!(project_id = %id, user_id = %user, add, "updating like membership");
        self.ports.projects.set_like_membership(id, user, add).await
    }

    /// Start an upload after the local checks pass.
    ///
    /// A rejected asset never reaches the blob store. The returned stream
    /// yields non-decreasing progress and exactly one terminal event.
    pub fn upload_asset(&self, asset: Asset) -> Result<UploadStream, UploadError> {
        asset.check(self.max_upload_bytes)?;
        debug!(name = asset.name(), size = asset.len(), "starting asset upload");
        Ok(guard_upload(self.ports.assets.upload(asset)))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{MAX_UPLOAD_BYTES, UploadEvent};
    use crate::domain::ports::{
        MockAssetStorage, MockIdentityProvider, MockProfileRepository, MockProjectRepository,
    };
    use futures::StreamExt;
    use futures::stream;
    use rstest::rstest;

    fn gateway(identity: MockIdentityProvider, assets: MockAssetStorage) -> RemoteGateway {
        RemoteGateway::new(
            GatewayPorts {
                identity: Arc::new(identity),
                profiles: Arc::new(MockProfileRepository::new()),
                projects: Arc::new(MockProjectRepository::new()),
                assets: Arc::new(assets),
            },
            MAX_UPLOAD_BYTES,
        )
    }

    #[rstest]
    #[case::not_an_image(Asset::new("cv.pdf", "application/pdf", vec![1; 8]))]
    #[case::too_large(Asset::new("big.png", "image/png", vec![1; MAX_UPLOAD_BYTES + 1]))]
    fn rejected_assets_never_reach_storage(#[case] asset: Asset) {
        let mut assets = MockAssetStorage::new();
        assets.expect_upload().times(0);
        let gateway = gateway(MockIdentityProvider::new(), assets);

        assert!(gateway.upload_asset(asset).is_err());
    }

    #[tokio::test]
    async fn accepted_upload_is_guarded() {
        let mut assets = MockAssetStorage::new();
        assets.expect_upload().times(1).return_once(|_| {
            stream::iter(vec![UploadEvent::Progress(60), UploadEvent::Progress(30)]).boxed()
        });
        let gateway = gateway(MockIdentityProvider::new(), assets);

        let events: Vec<_> = gateway
            .upload_asset(Asset::new("a.png", "image/png", vec![1; 4]))
            .expect("asset passes checks")
            .collect()
            .await;

        assert_eq!(events.first(), Some(&UploadEvent::Progress(60)));
        assert!(events.last().is_some_and(UploadEvent::is_terminal));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn sign_out_failures_are_swallowed() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_out()
            .times(1)
            .return_once(|| Err(BackendError::unavailable("offline")));
        let gateway = gateway(identity, MockAssetStorage::new());

        gateway.sign_out().await;
    }
}
