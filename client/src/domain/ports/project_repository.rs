//! Port abstraction for project documents and their liker sets.
use async_trait::async_trait;

use crate::domain::{Project, ProjectId, UserId};

use super::BackendError;

/// Project persistence as exposed by the document store.
///
/// Listings are unordered snapshots; ordering belongs to the view layer.
/// Liker membership changes are atomic set operations on the backend so
/// concurrent stars from different users never overwrite each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Every published project.
    async fn list_projects(&self) -> Result<Vec<Project>, BackendError>;

    /// Projects owned by `owner`.
    async fn list_projects_by_owner(&self, owner: &UserId) -> Result<Vec<Project>, BackendError>;

    /// Persist a new project and return its assigned id.
    async fn create_project(&self, project: &Project) -> Result<ProjectId, BackendError>;

    /// Fully replace the project stored under `id`.
    async fn replace_project(&self, id: &ProjectId, project: &Project)
    -> Result<(), BackendError>;

    /// Remove the project stored under `id`.
    async fn delete_project(&self, id: &ProjectId) -> Result<(), BackendError>;

    /// Add (`add = true`) or remove `user` from the project's liker set.
    async fn set_like_membership(
        &self,
        id: &ProjectId,
        user: &UserId,
        add: bool,
    ) -> Result<(), BackendError>;
}
