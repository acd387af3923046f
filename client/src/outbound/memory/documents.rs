//! Document store half of the in-memory backend.

use async_trait::async_trait;

use super::{BackendOperation, MemoryBackend};
use crate::domain::ports::{BackendError, ProfileRepository, ProjectRepository};
use crate::domain::{Project, ProjectId, UserId, UserProfile};

fn missing(id: &ProjectId) -> BackendError {
    BackendError::document_not_found(format!("No document to update: projects/{id}"))
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn read_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        self.with_data(BackendOperation::ReadProfile, |data| {
            Ok(data.profiles.get(id).cloned())
        })
    }

    async fn write_profile(&self, profile: &UserProfile) -> Result<(), BackendError> {
        self.with_data(BackendOperation::WriteProfile, |data| {
            data.profiles.insert(profile.id.clone(), profile.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl ProjectRepository for MemoryBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, BackendError> {
        self.with_data(BackendOperation::ListProjects, |data| {
            Ok(data.projects.values().cloned().collect())
        })
    }

    async fn list_projects_by_owner(&self, owner: &UserId) -> Result<Vec<Project>, BackendError> {
        self.with_data(BackendOperation::ListProjectsByOwner, |data| {
            Ok(data
                .projects
                .values()
                .filter(|project| project.is_owned_by(owner))
                .cloned()
                .collect())
        })
    }

    async fn create_project(&self, project: &Project) -> Result<ProjectId, BackendError> {
        self.with_data(BackendOperation::CreateProject, |data| {
            let mut fresh = project.clone();
            fresh.id = None;
            Ok(data.insert_project(fresh))
        })
    }

    async fn replace_project(
        &self,
        id: &ProjectId,
        project: &Project,
    ) -> Result<(), BackendError> {
        self.with_data(BackendOperation::ReplaceProject, |data| {
            let stored = data.projects.get_mut(id).ok_or_else(|| missing(id))?;
            let mut replacement = project.clone();
            replacement.id = Some(id.clone());
            *stored = replacement;
            Ok(())
        })
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), BackendError> {
        self.with_data(BackendOperation::DeleteProject, |data| {
            data.projects.remove(id).map(|_| ()).ok_or_else(|| missing(id))
        })
    }

    async fn set_like_membership(
        &self,
        id: &ProjectId,
        user: &UserId,
        add: bool,
    ) -> Result<(), BackendError> {
        self.with_data(BackendOperation::SetLikeMembership, |data| {
            let project = data.projects.get_mut(id).ok_or_else(|| missing(id))?;
            if add {
                project.likers.insert(user.clone());
            } else {
                project.likers.remove(user);
            }
            Ok(())
        })
    }
}
