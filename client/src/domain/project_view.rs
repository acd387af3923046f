//! Search and sort projection over the in-memory project listing.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::project::Project;
use super::state::ProjectSlice;

/// Ordering applied to the filtered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Keep listing order.
    #[default]
    None,
    TitleAscending,
    TitleDescending,
    /// Most likes first; ties keep listing order.
    MostVotes,
}

/// Raised when a sort selector value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort key: {0}")]
pub struct SortKeyParseError(pub String);

impl FromStr for SortKey {
    type Err = SortKeyParseError;

    /// Parse the values used by the sort selector.
    ///
    /// # Examples
    /// ```
    /// use client::domain::SortKey;
    ///
    /// assert_eq!("z-a".parse::<SortKey>().unwrap(), SortKey::TitleDescending);
    /// assert_eq!("".parse::<SortKey>().unwrap(), SortKey::None);
    /// ```
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" => Ok(Self::None),
            "a-z" => Ok(Self::TitleAscending),
            "z-a" => Ok(Self::TitleDescending),
            "most-votes" => Ok(Self::MostVotes),
            other => Err(SortKeyParseError(other.to_owned())),
        }
    }
}

fn compare_titles(left: &Project, right: &Project) -> Ordering {
    left.title
        .to_lowercase()
        .cmp(&right.title.to_lowercase())
        .then_with(|| left.title.cmp(&right.title))
}

fn matches(project: &Project, needle: &str) -> bool {
    project.title.to_lowercase().contains(needle)
        || project
            .points
            .iter()
            .any(|point| point.to_lowercase().contains(needle))
}

/// Filter `projects` by `query` and order the result by `sort`.
///
/// The query matches case-insensitively against the title or any
/// description point; a blank query keeps every project. All sorts are
/// stable.
pub fn filter_and_sort(projects: &[Project], query: &str, sort: SortKey) -> Vec<Project> {
    let needle = query.trim().to_lowercase();
    let mut view: Vec<Project> = projects
        .iter()
        .filter(|project| needle.is_empty() || matches(project, &needle))
        .cloned()
        .collect();
    match sort {
        SortKey::None => {}
        SortKey::TitleAscending => view.sort_by(compare_titles),
        SortKey::TitleDescending => view.sort_by(|left, right| compare_titles(right, left)),
        SortKey::MostVotes => view.sort_by(|left, right| right.like_count().cmp(&left.like_count())),
    }
    view
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewKey {
    revision: u64,
    query: String,
    sort: SortKey,
}

/// Memoised [`filter_and_sort`] keyed on listing revision, query and sort.
#[derive(Debug, Default)]
pub struct ProjectView {
    cached: Option<(ViewKey, Arc<Vec<Project>>)>,
    computations: usize,
}

impl ProjectView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection of the slice's listing, recomputed only when the listing
    /// revision, the query or the sort key changed.
    pub fn compute(&mut self, projects: &ProjectSlice, query: &str, sort: SortKey) -> Arc<Vec<Project>> {
        let key = ViewKey {
            revision: projects.listing_revision,
            query: query.to_owned(),
            sort,
        };
        if let Some((cached_key, view)) = &self.cached {
            if *cached_key == key {
                return Arc::clone(view);
            }
        }
        let view = Arc::new(filter_and_sort(&projects.listing, query, sort));
        self.computations += 1;
        self.cached = Some((key, Arc::clone(&view)));
        view
    }

    /// Number of recomputations so far.
    pub fn computations(&self) -> usize {
        self.computations
    }
}
