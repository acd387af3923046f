//! Port abstraction for the backend identity provider.
use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{EmailAddress, LoginCredentials, UserId};

use super::BackendError;

/// Stream of identity reports: the current identity (or `None`) once at
/// subscription time, then again on every change.
pub type IdentityStream = BoxStream<'static, Option<UserId>>;

/// Account creation, authentication and credential lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account and return its identity.
    async fn create_identity(&self, credentials: &LoginCredentials)
    -> Result<UserId, BackendError>;

    /// Authenticate an existing account and return its identity.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, BackendError>;

    /// Drop the backend credential. Repeated calls are harmless.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Ask the backend to email a password reset link.
    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), BackendError>;

    /// Subscribe to identity changes.
    fn identity_changes(&self) -> IdentityStream;
}
