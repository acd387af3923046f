//! Profile editing for the signed-in user.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::info;
use url::Url;

use super::asset::{Asset, UploadEvent};
use super::error::Error;
use super::gateway::RemoteGateway;
use super::ports::{Notice, Notifier};
use super::session_guard::SessionGuard;
use super::state::{Lifecycle, Transition};
use super::store::StateStore;
use super::user::{DisplayName, UserProfile};

pub const PROFILE_UPDATED_NOTICE: &str = "Profile details updated successfully.";
pub const PROFILE_UPDATE_FAILED_NOTICE: &str = "Failed to update profile details.";

/// Editable profile fields as entered in the form.
///
/// Blank optional fields clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub name: String,
    pub designation: String,
    pub github: String,
    pub linkedin: String,
}

impl ProfileEdit {
    /// Prefill the form from a stored profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            designation: profile.designation.clone().unwrap_or_default(),
            github: profile.github.clone().unwrap_or_default(),
            linkedin: profile.linkedin.clone().unwrap_or_default(),
        }
    }

    /// Validate the form and merge it into `current`.
    ///
    /// Identity, email and image always come from `current`.
    pub fn apply_to(self, current: &UserProfile) -> Result<UserProfile, Error> {
        let name = DisplayName::new(self.name)?;
        Ok(UserProfile {
            id: current.id.clone(),
            name: name.into(),
            email: current.email.clone(),
            profile_image: current.profile_image.clone(),
            designation: optional(&self.designation),
            github: optional_url(&self.github, "github")?,
            linkedin: optional_url(&self.linkedin, "linkedin")?,
        })
    }
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn optional_url(raw: &str, field: &str) -> Result<Option<String>, Error> {
    let Some(value) = optional(raw) else {
        return Ok(None);
    };
    Url::parse(&value).map_err(|_| {
        Error::invalid_request("Invalid URL").with_details(serde_json::json!({ "field": field }))
    })?;
    Ok(Some(value))
}

/// Progress of a profile image replacement.
pub type ProfileImageStream = BoxStream<'static, Result<UploadEvent, Error>>;

/// Validated edits to the signed-in user's profile.
#[derive(Clone)]
pub struct ProfileEditor {
    gateway: RemoteGateway,
    store: StateStore,
    guard: SessionGuard,
    notifier: Arc<dyn Notifier>,
}

impl ProfileEditor {
    pub fn new(gateway: RemoteGateway, guard: SessionGuard, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            store: guard.store().clone(),
            guard,
            notifier,
        }
    }

    /// Save the edited profile fields.
    pub async fn update_profile(&self, edit: ProfileEdit) -> Result<UserProfile, Error> {
        let current = self.current_profile()?;
        let profile = edit.apply_to(&current)?;
        self.write(profile).await
    }

    /// Upload a new avatar and store its URI on the profile.
    ///
    /// Upload events are forwarded as they arrive. After the terminal
    /// `Done` event the profile write runs; a write failure is yielded as
    /// the stream's final item.
    pub fn replace_profile_image(&self, asset: Asset) -> Result<ProfileImageStream, Error> {
        self.current_profile()?;
        let upload = self.gateway.upload_asset(asset).map_err(|err| {
            let error = Error::from(err);
            self.notifier.notify(Notice::error(error.message()));
            error
        })?;
        let editor = self.clone();
        let stream = upload
            .then(move |event| {
                let editor = editor.clone();
                async move {
                    match event {
                        UploadEvent::Done(uri) => editor
                            .store_image(uri.clone())
                            .await
                            .map(|_| UploadEvent::Done(uri)),
                        UploadEvent::Failed(message) => {
                            editor.notifier.notify(Notice::error(message.clone()));
                            Ok(UploadEvent::Failed(message))
                        }
                        progress => Ok(progress),
                    }
                }
            })
            .boxed();
        Ok(stream)
    }

    async fn store_image(&self, uri: String) -> Result<UserProfile, Error> {
        let mut profile = self.current_profile()?;
        profile.profile_image = Some(uri);
        self.write(profile).await
    }

    async fn write(&self, profile: UserProfile) -> Result<UserProfile, Error> {
        self.store
            .dispatch(Transition::ProfileUpdate(Lifecycle::Pending));
        if let Err(err) = self.gateway.write_profile(&profile).await {
            let error = Error::from(err);
            self.notifier
                .notify(Notice::error(PROFILE_UPDATE_FAILED_NOTICE));
            self.store
                .dispatch(Transition::ProfileUpdate(Lifecycle::Rejected(error.clone())));
            return Err(error);
        }
        self.store
            .dispatch(Transition::ProfileUpdate(Lifecycle::Fulfilled(profile.clone())));
        self.notifier.notify(Notice::success(PROFILE_UPDATED_NOTICE));
        info!(user_id = %profile.id, "profile updated");
        Ok(profile)
    }

    fn current_profile(&self) -> Result<UserProfile, Error> {
        let current = self
            .guard
            .current_user()
            .and_then(|_| self.store.select(|state| state.profile().cloned()));
        current.ok_or_else(|| {
            let error = Error::auth_required();
            self.notifier.notify(Notice::info(error.message()));
            error
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        BackendError, MockAssetStorage, MockIdentityProvider, MockProfileRepository,
        MockProjectRepository, NoticeLevel,
    };
    use crate::domain::{
        ErrorCode, GatewayPorts, MAX_UPLOAD_BYTES, Session, SharedClock, UserId,
    };
    use crate::domain::ports::ExpirySlot;
    use crate::outbound::MemoryExpirySlot;
    use crate::test_support::{MutableClock, RecordingNotifier, fixture_now};
    use chrono::TimeDelta;
    use futures::stream;
    use rstest::rstest;

    fn stored_profile() -> UserProfile {
        let mut profile = UserProfile::new(UserId::new("u1").expect("id"), "Ada", "ada@example.com");
        profile.profile_image = Some("memory://assets/old.png".to_owned());
        profile
    }

    fn editor(
        profiles: MockProfileRepository,
        assets: MockAssetStorage,
        signed_in: bool,
    ) -> (ProfileEditor, StateStore, Arc<RecordingNotifier>) {
        editor_with(
            profiles,
            assets,
            signed_in,
            Arc::new(MemoryExpirySlot::new()),
            Arc::new(MutableClock::new(fixture_now())),
        )
    }

    fn editor_with(
        profiles: MockProfileRepository,
        assets: MockAssetStorage,
        signed_in: bool,
        expiry: Arc<dyn ExpirySlot>,
        clock: SharedClock,
    ) -> (ProfileEditor, StateStore, Arc<RecordingNotifier>) {
        let mut identity = MockIdentityProvider::new();
        identity.expect_sign_out().returning(|| Ok(()));
        let gateway = RemoteGateway::new(
            GatewayPorts {
                identity: Arc::new(identity),
                profiles: Arc::new(profiles),
                projects: Arc::new(MockProjectRepository::new()),
                assets: Arc::new(assets),
            },
            MAX_UPLOAD_BYTES,
        );
        let store = StateStore::default();
        if signed_in {
            let profile = stored_profile();
            store.dispatch(Transition::SessionRecorded(Session::authenticated(
                profile.id.clone(),
                fixture_now(),
            )));
            store.dispatch(Transition::SignIn(Lifecycle::Fulfilled(profile)));
        }
        let guard = SessionGuard::new(gateway.clone(), store.clone(), expiry, clock);
        let notifier = Arc::new(RecordingNotifier::default());
        (
            ProfileEditor::new(gateway, guard, notifier.clone()),
            store,
            notifier,
        )
    }

    fn edit(name: &str, github: &str) -> ProfileEdit {
        ProfileEdit {
            name: name.to_owned(),
            designation: " Engineer ".to_owned(),
            github: github.to_owned(),
            linkedin: String::new(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn update_preserves_identity_email_and_image() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_write_profile()
            .withf(|profile| profile.email == "ada@example.com" && profile.name == "Ada L.")
            .times(1)
            .return_once(|_| Ok(()));
        let (editor, store, notifier) = editor(profiles, MockAssetStorage::new(), true);

        let updated = editor
            .update_profile(edit("Ada L.", "https://github.com/ada"))
            .await
            .expect("update succeeds");

        assert_eq!(updated.id, stored_profile().id);
        assert_eq!(updated.profile_image, stored_profile().profile_image);
        assert_eq!(updated.designation.as_deref(), Some("Engineer"));
        assert_eq!(store.select(|s| s.profile().cloned()), Some(updated));
        assert_eq!(
            notifier.messages(NoticeLevel::Success),
            vec![PROFILE_UPDATED_NOTICE.to_owned()]
        );
    }

    #[rstest]
    #[case::blank_name("  ", "", "Name required")]
    #[case::bad_github("Ada", "github dot com", "Invalid URL")]
    #[tokio::test]
    async fn invalid_edits_never_reach_backend(
        #[case] name: &str,
        #[case] github: &str,
        #[case] message: &str,
    ) {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_write_profile().times(0);
        let (editor, store, _) = editor(profiles, MockAssetStorage::new(), true);
        let before = store.snapshot();

        let err = editor
            .update_profile(edit(name, github))
            .await
            .expect_err("invalid edit");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), message);
        assert_eq!(store.snapshot(), before);
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_users_cannot_edit() {
        let (editor, _, _) = editor(MockProfileRepository::new(), MockAssetStorage::new(), false);
        let err = editor
            .update_profile(edit("Ada", ""))
            .await
            .expect_err("login required");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn lapsed_session_cannot_edit() {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_write_profile().times(0);
        let expiry = Arc::new(MemoryExpirySlot::new());
        expiry
            .store(fixture_now() + TimeDelta::hours(24))
            .expect("memory slot writable");
        let clock = Arc::new(MutableClock::new(fixture_now()));
        let (editor, store, _) = editor_with(
            profiles,
            MockAssetStorage::new(),
            true,
            expiry,
            clock.clone(),
        );
        clock.advance(TimeDelta::hours(25));

        let err = editor
            .update_profile(edit("Ada", ""))
            .await
            .expect_err("session lapsed");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(store.select(|s| s.profile().is_none()));
    }

    #[rstest]
    #[tokio::test]
    async fn backend_failure_rejects_update() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_write_profile()
            .times(1)
            .return_once(|_| Err(BackendError::unavailable("offline")));
        let (editor, store, notifier) = editor(profiles, MockAssetStorage::new(), true);

        let err = editor
            .update_profile(edit("Ada", ""))
            .await
            .expect_err("backend failure");

        assert_eq!(err.code(), ErrorCode::Backend);
        assert!(store.select(|s| s.user.last_error.is_some()));
        assert_eq!(store.select(|s| s.profile().cloned()), Some(stored_profile()));
        assert_eq!(
            notifier.messages(NoticeLevel::Error),
            vec![PROFILE_UPDATE_FAILED_NOTICE.to_owned()]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn replaced_image_is_written_after_upload_completes() {
        let mut assets = MockAssetStorage::new();
        assets.expect_upload().times(1).return_once(|_| {
            stream::iter(vec![
                UploadEvent::Progress(50),
                UploadEvent::Progress(100),
                UploadEvent::Done("memory://assets/new.png".to_owned()),
            ])
            .boxed()
        });
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_write_profile()
            .withf(|profile| profile.profile_image.as_deref() == Some("memory://assets/new.png"))
            .times(1)
            .return_once(|_| Ok(()));
        let (editor, store, _) = editor(profiles, assets, true);

        let events: Vec<_> = editor
            .replace_profile_image(Asset::new("new.png", "image/png", vec![1; 16]))
            .expect("upload starts")
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(Result::is_ok));
        assert_eq!(
            store.select(|s| s.profile().and_then(|p| p.profile_image.clone())),
            Some("memory://assets/new.png".to_owned())
        );
    }

    #[rstest]
    fn non_image_avatar_is_rejected_before_upload() {
        let mut assets = MockAssetStorage::new();
        assets.expect_upload().times(0);
        let (editor, _, notifier) = editor(MockProfileRepository::new(), assets, true);

        let err = editor
            .replace_profile_image(Asset::new("cv.pdf", "application/pdf", vec![1; 16]))
            .err()
            .expect("rejected");

        assert_eq!(err.code(), ErrorCode::Upload);
        assert_eq!(
            notifier.messages(NoticeLevel::Error),
            vec!["File must be an image".to_owned()]
        );
    }
}
