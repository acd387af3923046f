//! Identity provider half of the in-memory backend.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use super::{BackendOperation, MemoryBackend};
use crate::domain::ports::{BackendError, IdentityProvider, IdentityStream};
use crate::domain::{EmailAddress, LoginCredentials, UserId};

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn create_identity(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<UserId, BackendError> {
        let user_id = self.with_data(BackendOperation::CreateIdentity, |data| {
            data.insert_account(credentials.email().as_ref(), credentials.password())
        })?;
        self.identity.send_replace(Some(user_id.clone()));
        Ok(user_id)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, BackendError> {
        let user_id = self.with_data(BackendOperation::Authenticate, |data| {
            let key = credentials.email().as_ref().to_ascii_lowercase();
            let account = data.accounts.get(&key).ok_or_else(|| {
                BackendError::user_not_found("Firebase: Error (auth/user-not-found).")
            })?;
            if account.password != credentials.password() {
                return Err(BackendError::wrong_credential(
                    "Firebase: Error (auth/wrong-password).",
                ));
            }
            Ok(account.user_id.clone())
        })?;
        self.identity.send_replace(Some(user_id.clone()));
        Ok(user_id)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.with_data(BackendOperation::SignOut, |_| Ok(()))?;
        self.identity.send_replace(None);
        Ok(())
    }

    async fn request_password_reset(&self, email: &EmailAddress) -> Result<(), BackendError> {
        self.with_data(BackendOperation::PasswordReset, |data| {
            let key = email.as_ref().to_ascii_lowercase();
            if !data.accounts.contains_key(&key) {
                return Err(BackendError::user_not_found(
                    "Firebase: Error (auth/user-not-found).",
                ));
            }
            data.password_resets.push(email.clone());
            Ok(())
        })
    }

    fn identity_changes(&self) -> IdentityStream {
        let receiver = self.identity.subscribe();
        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let current = receiver.borrow_and_update().clone();
            Some((current, (receiver, false)))
        })
        .boxed()
    }
}

