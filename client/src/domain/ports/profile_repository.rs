//! Port abstraction for user profile documents.
use async_trait::async_trait;

use crate::domain::{UserId, UserProfile};

use super::BackendError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the profile stored for `id`, if any.
    async fn read_profile(&self, id: &UserId) -> Result<Option<UserProfile>, BackendError>;

    /// Replace (or create) the profile document keyed by its identity.
    async fn write_profile(&self, profile: &UserProfile) -> Result<(), BackendError>;
}
