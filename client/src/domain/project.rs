//! Showcase project aggregate and its form validation.
//!
//! A [`Project`] is only ever built from a [`ProjectDraft`] that passed
//! [`ProjectDraft::validate`] or from a backend document; the liker set is
//! the single source of truth for the like count.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::user::UserId;

/// Minimum number of description points a project must carry.
pub const MIN_DESCRIPTION_POINTS: usize = 2;
/// Maximum number of description points a project may carry.
pub const MAX_DESCRIPTION_POINTS: usize = 5;

/// Reasons a project form is rejected before any backend call.
///
/// Display strings are the inline form messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    MissingThumbnail,
    MissingRepository,
    InvalidUrl { field: &'static str },
    MissingTitle,
    MissingOverview,
    MissingDescription,
    TooFewPoints { min: usize },
    TooManyPoints { max: usize },
    BlankPoint,
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingThumbnail => write!(f, "photo for project is required"),
            Self::MissingRepository => write!(f, "Project's repository link required"),
            Self::InvalidUrl { .. } => write!(f, "Invalid URL"),
            Self::MissingTitle => write!(f, "Project's Title required"),
            Self::MissingOverview => write!(f, "Project's Overview required"),
            Self::MissingDescription => write!(f, "Description of Project is required"),
            Self::TooFewPoints { min } => {
                write!(f, "Minimum {min} description points required")
            }
            Self::TooManyPoints { max } => {
                write!(f, "Maximum {max} description points allowed")
            }
            Self::BlankPoint => write!(f, "Description points cannot be empty"),
        }
    }
}

impl std::error::Error for ProjectValidationError {}

impl ProjectValidationError {
    /// Form field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingThumbnail => "thumbnail",
            Self::MissingRepository => "github",
            Self::InvalidUrl { field } => *field,
            Self::MissingTitle => "title",
            Self::MissingOverview => "overview",
            Self::MissingDescription
            | Self::TooFewPoints { .. }
            | Self::TooManyPoints { .. }
            | Self::BlankPoint => "points",
        }
    }
}

/// Backend-assigned project document identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Wrap a backend document id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A published showcase project.
///
/// Wire names follow the backend document: `pid`, `github`, `link`,
/// `likes`, `refUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Document id; `None` until first persisted.
    #[serde(rename = "pid", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProjectId>,
    /// Project title.
    pub title: String,
    /// One-paragraph overview.
    pub overview: String,
    /// Thumbnail image URI.
    pub thumbnail: String,
    /// Source repository URI.
    #[serde(rename = "github")]
    pub repository: String,
    /// Optional deployed/demo URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Ordered description points.
    pub points: Vec<String>,
    /// Identities that starred the project.
    #[serde(rename = "likes", default)]
    pub likers: BTreeSet<UserId>,
    /// Owning identity.
    #[serde(rename = "refUser")]
    pub owner: UserId,
}

impl Project {
    /// Number of distinct likers.
    pub fn like_count(&self) -> usize {
        self.likers.len()
    }

    /// Whether `user_id` is in the liker set.
    pub fn is_liked_by(&self, user_id: &UserId) -> bool {
        self.likers.contains(user_id)
    }

    /// Whether `user_id` owns the project.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }
}

/// Raw project form values as entered by the owner.
///
/// Start from [`ProjectDraft::default`] for a new project or
/// [`ProjectDraft::from_project`] when editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    /// Present when editing an existing project.
    pub id: Option<ProjectId>,
    pub thumbnail: String,
    pub title: String,
    pub overview: String,
    pub github: String,
    pub link: String,
    pub points: Vec<String>,
    /// Carried through edits unchanged.
    pub likers: BTreeSet<UserId>,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            id: None,
            thumbnail: String::new(),
            title: String::new(),
            overview: String::new(),
            github: String::new(),
            link: String::new(),
            points: vec![String::new(); MIN_DESCRIPTION_POINTS],
            likers: BTreeSet::new(),
        }
    }
}

impl ProjectDraft {
    /// Prefill the form from an existing project.
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            thumbnail: project.thumbnail.clone(),
            title: project.title.clone(),
            overview: project.overview.clone(),
            github: project.repository.clone(),
            link: project.link.clone().unwrap_or_default(),
            points: project.points.clone(),
            likers: project.likers.clone(),
        }
    }

    /// Append an empty description point, refusing past the maximum.
    ///
    /// Returns `false` when the draft already holds the maximum.
    pub fn add_point(&mut self) -> bool {
        if self.points.len() >= MAX_DESCRIPTION_POINTS {
            return false;
        }
        self.points.push(String::new());
        true
    }

    /// Validate the form and build the project owned by `owner`.
    ///
    /// Checks run in form order so the first failing field is reported.
    pub fn validate(self, owner: UserId) -> Result<Project, ProjectValidationError> {
        let thumbnail = required(&self.thumbnail, ProjectValidationError::MissingThumbnail)?;
        let repository = required(&self.github, ProjectValidationError::MissingRepository)?;
        ensure_url(&repository, "github")?;
        let link = match self.link.trim() {
            "" => None,
            raw => {
                ensure_url(raw, "link")?;
                Some(raw.to_owned())
            }
        };
        let title = required(&self.title, ProjectValidationError::MissingTitle)?;
        let overview = required(&self.overview, ProjectValidationError::MissingOverview)?;
        let points = validate_points(&self.points)?;

        Ok(Project {
            id: self.id,
            title,
            overview,
            thumbnail,
            repository,
            link,
            points,
            likers: self.likers,
            owner,
        })
    }
}

fn required(value: &str, error: ProjectValidationError) -> Result<String, ProjectValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_owned())
}

fn ensure_url(raw: &str, field: &'static str) -> Result<(), ProjectValidationError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|_| ProjectValidationError::InvalidUrl { field })
}

fn validate_points(points: &[String]) -> Result<Vec<String>, ProjectValidationError> {
    let filled = points.iter().filter(|point| !point.trim().is_empty()).count();
    if filled == 0 {
        return Err(ProjectValidationError::MissingDescription);
    }
    if filled < MIN_DESCRIPTION_POINTS {
        return Err(ProjectValidationError::TooFewPoints {
            min: MIN_DESCRIPTION_POINTS,
        });
    }
    if filled != points.len() {
        return Err(ProjectValidationError::BlankPoint);
    }
    if filled > MAX_DESCRIPTION_POINTS {
        return Err(ProjectValidationError::TooManyPoints {
            max: MAX_DESCRIPTION_POINTS,
        });
    }
    Ok(points.iter().map(|point| point.trim().to_owned()).collect())
}

#[cfg(test)]
mod tests;
