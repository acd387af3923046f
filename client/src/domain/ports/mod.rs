//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod asset_storage;
mod backend_error;
mod expiry_slot;
mod identity_provider;
mod notifier;
mod profile_repository;
mod project_repository;

pub use asset_storage::AssetStorage;
#[cfg(test)]
pub use asset_storage::MockAssetStorage;
pub use backend_error::{
    BackendError, DOCUMENT_NOT_FOUND_CODE, EMAIL_IN_USE_CODE, UNAVAILABLE_CODE,
    USER_NOT_FOUND_CODE, WRONG_CREDENTIAL_CODE,
};
#[cfg(test)]
pub use expiry_slot::MockExpirySlot;
pub use expiry_slot::{ExpirySlot, ExpirySlotError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityStream};
pub use notifier::{Notice, NoticeLevel, Notifier};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::ProfileRepository;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::ProjectRepository;
