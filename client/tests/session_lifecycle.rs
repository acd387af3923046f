//! Session lifecycle against the in-memory backend.
//!
//! Each scenario wires a full [`ClientContext`] with a file-backed expiry
//! slot, a controllable clock and a recording notifier.

use std::sync::Arc;

use chrono::TimeDelta;
use client::domain::ports::{ExpirySlot, NoticeLevel};
use client::domain::{ErrorCode, SessionPhase, SessionPolicy};
use client::outbound::{BackendOperation, FileExpirySlot, MemoryBackend};
use client::test_support::{MutableClock, RecordingNotifier, fixture_now, temp_expiry_slot};
use client::{ClientContext, ClientPorts};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct World {
    backend: MemoryBackend,
    clock: Arc<MutableClock>,
    notifier: Arc<RecordingNotifier>,
    expiry: Arc<FileExpirySlot>,
    _dir: TempDir,
}

impl World {
    fn context(&self) -> ClientContext {
        let ports = ClientPorts::in_memory(&self.backend)
            .with_expiry(self.expiry.clone())
            .with_notifier(self.notifier.clone())
            .with_clock(self.clock.clone());
        ClientContext::new(ports, SessionPolicy::default())
    }
}

#[fixture]
fn world() -> World {
    let (dir, slot) = temp_expiry_slot();
    World {
        backend: MemoryBackend::new(),
        clock: Arc::new(MutableClock::new(fixture_now())),
        notifier: Arc::new(RecordingNotifier::default()),
        expiry: Arc::new(slot),
        _dir: dir,
    }
}

#[rstest]
#[tokio::test]
async fn session_lapses_one_day_after_sign_up(world: World) {
    let ctx = world.context();
    ctx.session()
        .sign_up("Ada", "ada@example.com", "secret", "secret")
        .await
        .expect("sign-up succeeds");

    assert_eq!(ctx.session().phase(), SessionPhase::Authenticated);
    assert_eq!(
        world.expiry.load().expect("expiry readable"),
        Some(fixture_now() + TimeDelta::hours(24))
    );

    world.clock.advance(TimeDelta::hours(24) + TimeDelta::milliseconds(1));

    assert_eq!(ctx.session().phase(), SessionPhase::Expired);
    assert_eq!(ctx.session().phase(), SessionPhase::Anonymous);
    assert_eq!(world.expiry.load().expect("expiry readable"), None);
    assert!(ctx.store().select(|state| state.profile().is_none()));
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_shows_friendly_notice(world: World) {
    world
        .backend
        .seed_account("ada@example.com", "secret", "Ada")
        .expect("seed account");
    let ctx = world.context();

    let err = ctx
        .session()
        .sign_up("Ada Again", "ada@example.com", "other", "other")
        .await
        .expect_err("email already registered");

    assert_eq!(err.code(), ErrorCode::Backend);
    assert_eq!(ctx.session().phase(), SessionPhase::Anonymous);
    assert_eq!(
        world.notifier.messages(NoticeLevel::Error),
        vec!["This email is already registered".to_owned()]
    );
    assert_eq!(world.backend.call_count(BackendOperation::WriteProfile), 0);
}

#[rstest]
#[tokio::test]
async fn surviving_credential_is_restored_on_start(world: World) {
    world
        .backend
        .seed_account("ada@example.com", "secret", "Ada")
        .expect("seed account");
    let first = world.context();
    let user_id = first
        .session()
        .sign_in("ada@example.com", "secret")
        .await
        .expect("sign-in succeeds")
        .id;
    drop(first);

    world.clock.advance(TimeDelta::hours(1));
    let mut second = world.context();
    second.start().expect("runtime available").ready().await;

    assert_eq!(second.session().current_user(), Some(user_id));
    assert_eq!(
        second
            .store()
            .select(|state| state.profile().map(|profile| profile.name.clone())),
        Some("Ada".to_owned())
    );
    assert_eq!(world.backend.call_count(BackendOperation::Authenticate), 1);
    assert_eq!(
        world.expiry.load().expect("expiry readable"),
        Some(fixture_now() + TimeDelta::hours(24))
    );
}

#[rstest]
#[tokio::test]
async fn lapsed_credential_is_not_restored(world: World) {
    let user_id = world
        .backend
        .seed_account("ada@example.com", "secret", "Ada")
        .expect("seed account");
    world.backend.set_current_identity(Some(user_id));
    world
        .expiry
        .store(fixture_now() - TimeDelta::seconds(1))
        .expect("seed expiry");

    let mut ctx = world.context();
    ctx.start().expect("runtime available").ready().await;

    assert_eq!(ctx.session().phase(), SessionPhase::Anonymous);
    assert_eq!(world.expiry.load().expect("expiry readable"), None);
    assert_eq!(world.backend.call_count(BackendOperation::ReadProfile), 0);
}

#[rstest]
#[tokio::test]
async fn sign_out_clears_persisted_expiry(world: World) {
    world
        .backend
        .seed_account("ada@example.com", "secret", "Ada")
        .expect("seed account");
    let ctx = world.context();
    ctx.session()
        .sign_in("ada@example.com", "secret")
        .await
        .expect("sign-in succeeds");

    ctx.session().sign_out();

    assert_eq!(ctx.session().phase(), SessionPhase::Anonymous);
    assert_eq!(world.expiry.load().expect("expiry readable"), None);
}

#[rstest]
#[tokio::test]
async fn password_reset_reaches_backend(world: World) {
    world
        .backend
        .seed_account("ada@example.com", "secret", "Ada")
        .expect("seed account");
    let ctx = world.context();

    ctx.session()
        .request_password_reset("ada@example.com")
        .await
        .expect("reset requested");

    let resets = world.backend.password_resets();
    assert_eq!(resets.len(), 1);
    assert_eq!(
        resets.first().map(|email| email.as_ref().to_owned()),
        Some("ada@example.com".to_owned())
    );
    assert_eq!(
        world.notifier.last().map(|notice| notice.level),
        Some(NoticeLevel::Info)
    );
}

#[rstest]
#[tokio::test]
async fn unknown_account_reports_user_not_found(world: World) {
    let ctx = world.context();

    let err = ctx
        .session()
        .sign_in("nobody@example.com", "secret")
        .await
        .expect_err("unknown account");

    assert_eq!(err.message(), "User not Found");
    assert_eq!(ctx.session().phase(), SessionPhase::Anonymous);
}
