//! Publishing, editing and deleting showcase projects.

use std::sync::Arc;

use tracing::{info, warn};

use super::asset::{Asset, UploadStream};
use super::error::Error;
use super::gateway::RemoteGateway;
use super::ports::{Notice, Notifier};
use super::project::{Project, ProjectDraft, ProjectId};
use super::session_guard::SessionGuard;
use super::state::{Lifecycle, Transition};
use super::store::StateStore;
use super::user::UserId;

pub const PROJECT_ADDED_NOTICE: &str = "Success! Your project has been added👍";
pub const PROJECT_UPDATED_NOTICE: &str = "Success! Your project has been updated.";
pub const PROJECT_DELETED_NOTICE: &str = "Your project has been deleted.";

/// Owner-side project use-cases.
#[derive(Clone)]
pub struct ProjectPublisher {
    gateway: RemoteGateway,
    store: StateStore,
    guard: SessionGuard,
    notifier: Arc<dyn Notifier>,
}

impl ProjectPublisher {
    pub fn new(gateway: RemoteGateway, guard: SessionGuard, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            store: guard.store().clone(),
            guard,
            notifier,
        }
    }

    /// Validate and persist a project form.
    ///
    /// Drafts without an id are created; drafts with an id replace the
    /// stored document once the signed-in user is confirmed as its owner.
    pub async fn save_project(&self, draft: ProjectDraft) -> Result<Project, Error> {
        let owner = self.current_user()?;
        let mut project = draft.validate(owner.clone())?;
        if let Some(id) = project.id.as_ref() {
            self.ensure_owned(&owner, id, "only the owner can edit this project")
                .await?;
        }

        self.store
            .dispatch(Transition::ProjectSave(Lifecycle::Pending));
        let outcome = match project.id.clone() {
            Some(id) => self
                .gateway
                .replace_project(&id, &project)
                .await
                .map(|()| PROJECT_UPDATED_NOTICE),
            None => self.gateway.create_project(&project).await.map(|id| {
                project.id = Some(id);
                PROJECT_ADDED_NOTICE
            }),
        };
        let notice = match outcome {
            Ok(notice) => notice,
            Err(err) => {
                let error = self.fail(err.into());
                self.store
                    .dispatch(Transition::ProjectSave(Lifecycle::Rejected(error.clone())));
                return Err(error);
            }
        };

        self.store
            .dispatch(Transition::ProjectSave(Lifecycle::Fulfilled(project.clone())));
        self.notifier.notify(Notice::success(notice));
        info!(
            project_id = %project.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            user_id = %owner,
            "project saved"
        );
        Ok(project)
    }

    /// Delete an owned project and return the owner's remaining projects.
    pub async fn delete_project(&self, project: &Project) -> Result<Vec<Project>, Error> {
        let owner = self.current_user()?;
        if !project.is_owned_by(&owner) {
            return Err(self.fail(Error::forbidden("only the owner can delete this project")));
        }
        let Some(id) = project.id.as_ref() else {
            return Err(Error::invalid_request("project has not been published yet"));
        };
        self.ensure_owned(&owner, id, "only the owner can delete this project")
            .await?;
        self.gateway
            .delete_project(id)
            .await
            .map_err(|err| self.fail(err.into()))?;
        self.notifier.notify(Notice::success(PROJECT_DELETED_NOTICE));
        info!(project_id = %id, user_id = %owner, "project deleted");

        if self.store.select(|state| state.projects.listing_loaded) {
            if let Err(error) = self.refresh_listing().await {
                warn!(error = %error, "listing refresh after delete failed");
            }
        }
        self.projects_for_owner(&owner).await
    }

    /// Load every project into the store.
    pub async fn refresh_listing(&self) -> Result<Vec<Project>, Error> {
        let listing = self
            .gateway
            .list_projects()
            .await
            .map_err(|err| self.fail(err.into()))?;
        self.store
            .dispatch(Transition::ListingLoaded(listing.clone()));
        Ok(listing)
    }

    /// Projects owned by `owner`, straight from the backend.
    pub async fn projects_for_owner(&self, owner: &UserId) -> Result<Vec<Project>, Error> {
        self.gateway
            .list_projects_by_owner(owner)
            .await
            .map_err(|err| self.fail(err.into()))
    }

    /// Upload a project thumbnail.
    pub fn upload_thumbnail(&self, asset: Asset) -> Result<UploadStream, Error> {
        self.gateway
            .upload_asset(asset)
            .map_err(|err| self.fail(err.into()))
    }

    /// Mark `project` as the one being viewed or edited.
    pub fn open_project(&self, project: Option<Project>) {
        self.store.dispatch(Transition::CurrentProject(project));
    }

    /// Confirm `owner` owns the stored project `id`.
    ///
    /// The loaded listing answers when it holds the project; otherwise the
    /// owner's projects are read from the backend.
    async fn ensure_owned(
        &self,
        owner: &UserId,
        id: &ProjectId,
        denial: &str,
    ) -> Result<(), Error> {
        let listed = self.store.select(|state| {
            state
                .listed_project(id)
                .map(|listed| listed.is_owned_by(owner))
        });
        let owned = match listed {
            Some(owned) => owned,
            None => self
                .projects_for_owner(owner)
                .await?
                .iter()
                .any(|project| project.id.as_ref() == Some(id)),
        };
        if owned {
            Ok(())
        } else {
            warn!(project_id = %id, user_id = %owner, "rejected change to a foreign project");
            Err(self.fail(Error::forbidden(denial)))
        }
    }

    fn current_user(&self) -> Result<UserId, Error> {
        self.guard.current_user().ok_or_else(|| {
            let error = Error::auth_required();
            self.notifier.notify(Notice::info(error.message()));
            error
        })
    }

    fn fail(&self, error: Error) -> Error {
        self.notifier.notify(Notice::error(error.message()));
        error
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
