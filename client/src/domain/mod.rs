//! Domain primitives, services and the application state store.
//!
//! Purpose: hold every rule of the showcase client that does not depend on
//! a concrete backend. Services talk to the outside world only through the
//! traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - UserProfile, Project, ProjectDraft, Asset: validated data.
//! - StateStore, ApplicationState, Transition: the observable state tree.
//! - SessionGuard: expiry-checked access to the signed-in identity.
//! - SessionManager, ProfileEditor, ProjectPublisher, LikeSynchronizer:
//!   use-cases.
//! - filter_and_sort, ProjectView: derived listing views.

pub mod asset;
pub mod auth;
pub mod error;
pub mod gateway;
pub mod identity_subscription;
pub mod like_sync;
pub mod ports;
pub mod profile_service;
pub mod project;
pub mod project_service;
pub mod project_view;
pub mod session;
pub mod session_guard;
pub mod session_service;
pub mod state;
pub mod store;
pub mod user;

pub use self::asset::{
    Asset, MAX_UPLOAD_BYTES, UploadError, UploadEvent, UploadStream, guard_upload,
    progress_percent,
};
pub use self::auth::{AuthValidationError, LoginCredentials, SignUpRequest};
pub use self::error::{AUTH_REQUIRED_MESSAGE, Error, ErrorCode, ErrorValidationError};
pub use self::gateway::{GatewayPorts, RemoteGateway};
pub use self::identity_subscription::IdentitySubscription;
pub use self::like_sync::{LikeSynchronizer, StarState, StarToggle, TOGGLE_IN_FLIGHT_MESSAGE};
pub use self::profile_service::{ProfileEdit, ProfileEditor, ProfileImageStream};
pub use self::project::{
    MAX_DESCRIPTION_POINTS, MIN_DESCRIPTION_POINTS, Project, ProjectDraft, ProjectId,
    ProjectValidationError,
};
pub use self::project_service::ProjectPublisher;
pub use self::project_view::{ProjectView, SortKey, SortKeyParseError, filter_and_sort};
pub use self::session::{
    DEFAULT_PROFILE_FETCH_ATTEMPTS, DEFAULT_SESSION_TTL_HOURS, Session, SessionPhase, SessionPolicy,
};
pub use self::session_guard::{SessionGuard, SharedClock};
pub use self::session_service::SessionManager;
pub use self::state::{ApplicationState, Lifecycle, ProjectSlice, Transition, UserSlice};
pub use self::store::StateStore;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, UserId, UserProfile, UserValidationError,
};
