//! Application state tree and the transitions that mutate it.
//!
//! [`ApplicationState::apply`] is the only mutation path. Every remote
//! operation is modelled as a [`Lifecycle`] of pending, fulfilled and
//! rejected phases; readers use the selector methods.

use serde::{Deserialize, Serialize};

use super::error::Error;
use super::project::{Project, ProjectId};
use super::session::Session;
use super::user::{UserId, UserProfile};

/// Phase of an asynchronous remote operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<T> {
    Pending,
    Fulfilled(T),
    Rejected(Error),
}

/// Every declared mutation of [`ApplicationState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    SignIn(Lifecycle<UserProfile>),
    SignUp(Lifecycle<UserProfile>),
    /// `Fulfilled(None)` means the identity has no stored profile yet.
    ProfileFetch(Lifecycle<Option<UserProfile>>),
    ProfileUpdate(Lifecycle<UserProfile>),
    ProjectSave(Lifecycle<Project>),
    /// Authoritative listing replaces every provisional value.
    ListingLoaded(Vec<Project>),
    /// Provisional liker-set change applied after a successful toggle.
    LikeApplied {
        project: ProjectId,
        user: UserId,
        liked: bool,
    },
    CurrentProject(Option<Project>),
    SessionRecorded(Session),
    SessionCleared,
    /// Reset the user slice and session to their initial values.
    Logout,
    /// Drop the profile without touching the authenticated flag.
    ResetUser,
}

impl<T> Lifecycle<T> {
    /// Phase label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled(_) => "fulfilled",
            Self::Rejected(_) => "rejected",
        }
    }
}

impl Transition {
    /// Stable operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignIn(_) => "sign_in",
            Self::SignUp(_) => "sign_up",
            Self::ProfileFetch(_) => "profile_fetch",
            Self::ProfileUpdate(_) => "profile_update",
            Self::ProjectSave(_) => "project_save",
            Self::ListingLoaded(_) => "listing_loaded",
            Self::LikeApplied { .. } => "like_applied",
            Self::CurrentProject(_) => "current_project",
            Self::SessionRecorded(_) => "session_recorded",
            Self::SessionCleared => "session_cleared",
            Self::Logout => "logout",
            Self::ResetUser => "reset_user",
        }
    }

    /// Lifecycle phase for remote operations, `None` for plain mutations.
    pub fn phase(&self) -> Option<&'static str> {
        match self {
            Self::SignIn(phase) | Self::SignUp(phase) | Self::ProfileUpdate(phase) => {
                Some(phase.label())
            }
            Self::ProfileFetch(phase) => Some(phase.label()),
            Self::ProjectSave(phase) => Some(phase.label()),
            _ => None,
        }
    }
}

/// Signed-in user data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSlice {
    pub profile: Option<UserProfile>,
    pub authenticated: bool,
    pub loading: bool,
    pub last_error: Option<Error>,
}

/// Project data: the project being viewed or edited plus the latest
/// authoritative listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSlice {
    pub current: Option<Project>,
    pub loading: bool,
    pub last_error: Option<Error>,
    pub listing: Vec<Project>,
    pub listing_loaded: bool,
    /// Bumped on every change to `listing`.
    pub listing_revision: u64,
}

/// The single state tree of an application run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    pub session: Session,
    pub user: UserSlice,
    pub projects: ProjectSlice,
}

impl ApplicationState {
    /// Apply one transition in place.
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::SignIn(phase) | Transition::SignUp(phase) => self.apply_credential(phase),
            Transition::ProfileFetch(phase) => self.apply_profile_fetch(phase),
            Transition::ProfileUpdate(phase) => match phase {
                Lifecycle::Pending => self.user.begin(),
                Lifecycle::Fulfilled(profile) => {
                    self.user.loading = false;
                    self.user.profile = Some(profile);
                }
                Lifecycle::Rejected(error) => self.user.fail(error),
            },
            Transition::ProjectSave(phase) => self.apply_project_save(phase),
            Transition::ListingLoaded(listing) => self.replace_listing(listing),
            Transition::LikeApplied {
                project,
                user,
                liked,
            } => self.apply_like(&project, user, liked),
            Transition::CurrentProject(project) => self.projects.current = project,
            Transition::SessionRecorded(session) => self.session = session,
            Transition::SessionCleared => self.session = Session::anonymous(),
            Transition::Logout => {
                self.user = UserSlice::default();
                self.session = Session::anonymous();
            }
            Transition::ResetUser => {
                self.user.profile = None;
                self.user.loading = false;
                self.user.last_error = None;
            }
        }
    }

    /// Return a copy with `transition` applied.
    pub fn reduce(mut self, transition: Transition) -> Self {
        self.apply(transition);
        self
    }

    fn apply_credential(&mut self, phase: Lifecycle<UserProfile>) {
        match phase {
            Lifecycle::Pending => self.user.begin(),
            Lifecycle::Fulfilled(profile) => {
                self.user.loading = false;
                self.user.authenticated = true;
                self.user.profile = Some(profile);
            }
            // Prior data survives a failed sign-in.
            Lifecycle::Rejected(error) => self.user.fail(error),
        }
    }

    fn apply_profile_fetch(&mut self, phase: Lifecycle<Option<UserProfile>>) {
        match phase {
            Lifecycle::Pending => self.user.begin(),
            Lifecycle::Fulfilled(profile) => {
                self.user.loading = false;
                self.user.authenticated = true;
                if let Some(profile) = profile {
                    self.user.profile = Some(profile);
                }
            }
            Lifecycle::Rejected(error) => {
                self.user.fail(error);
                self.user.authenticated = false;
                self.user.profile = None;
            }
        }
    }

    fn apply_project_save(&mut self, phase: Lifecycle<Project>) {
        match phase {
            Lifecycle::Pending => {
                self.projects.loading = true;
                self.projects.last_error = None;
            }
            Lifecycle::Fulfilled(project) => {
                self.projects.loading = false;
                self.upsert_listed(&project);
                self.projects.current = Some(project);
            }
            Lifecycle::Rejected(error) => {
                self.projects.loading = false;
                self.projects.last_error = Some(error);
            }
        }
    }

    fn replace_listing(&mut self, listing: Vec<Project>) {
        if let Some(current) = self.projects.current.as_mut() {
            let fresh = current
                .id
                .as_ref()
                .and_then(|id| listing.iter().find(|p| p.id.as_ref() == Some(id)));
            if let Some(fresh) = fresh {
                *current = fresh.clone();
            }
        }
        self.projects.listing = listing;
        self.projects.listing_loaded = true;
        self.bump_revision();
    }

    fn upsert_listed(&mut self, project: &Project) {
        let Some(id) = project.id.as_ref() else {
            return;
        };
        match self
            .projects
            .listing
            .iter_mut()
            .find(|listed| listed.id.as_ref() == Some(id))
        {
            Some(listed) => *listed = project.clone(),
            None => self.projects.listing.push(project.clone()),
        }
        self.bump_revision();
    }

    fn apply_like(&mut self, id: &ProjectId, user: UserId, liked: bool) {
        let set_membership = |project: &mut Project| {
            if liked {
                project.likers.insert(user.clone());
            } else {
                project.likers.remove(&user);
            }
        };
        let mut touched = false;
        for project in &mut self.projects.listing {
            if project.id.as_ref() == Some(id) {
                set_membership(project);
                touched = true;
            }
        }
        if let Some(current) = self.projects.current.as_mut() {
            if current.id.as_ref() == Some(id) {
                set_membership(current);
            }
        }
        if touched {
            self.bump_revision();
        }
    }

    fn bump_revision(&mut self) {
        self.projects.listing_revision = self.projects.listing_revision.wrapping_add(1);
    }

    /// Identity of the signed-in user, if any.
    pub fn current_user_id(&self) -> Option<&UserId> {
        if !self.user.authenticated {
            return None;
        }
        self.session
            .user_id
            .as_ref()
            .or_else(|| self.user.profile.as_ref().map(|profile| &profile.id))
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.authenticated
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.user.profile.as_ref()
    }

    /// Listed project with `id`, if present.
    pub fn listed_project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects
            .listing
            .iter()
            .find(|project| project.id.as_ref() == Some(id))
    }
}

impl UserSlice {
    fn begin(&mut self) {
        self.loading = true;
        self.last_error = None;
    }

    fn fail(&mut self, error: Error) {
        self.loading = false;
        self.last_error = Some(error);
    }
}

#[cfg(test)]
mod tests;
