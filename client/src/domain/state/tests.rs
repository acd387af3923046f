//! Regression coverage for the state reducer.

use std::collections::BTreeSet;

use super::*;
use chrono::DateTime;
use rstest::{fixture, rstest};

fn uid(raw: &str) -> UserId {
    UserId::new(raw).expect("user id")
}

fn project(id: &str, likers: &[&str]) -> Project {
    Project {
        id: Some(ProjectId::new(id)),
        title: format!("Project {id}"),
        overview: "overview".to_owned(),
        thumbnail: "https://cdn.example/t.png".to_owned(),
        repository: "https://github.com/x/y".to_owned(),
        link: None,
        points: vec!["a".to_owned(), "b".to_owned()],
        likers: likers.iter().map(|raw| uid(raw)).collect::<BTreeSet<_>>(),
        owner: uid("owner"),
    }
}

#[fixture]
fn signed_in() -> ApplicationState {
    let expires = DateTime::from_timestamp(1_700_086_400, 0).expect("timestamp");
    ApplicationState::default()
        .reduce(Transition::SessionRecorded(Session::authenticated(
            uid("u1"),
            expires,
        )))
        .reduce(Transition::SignIn(Lifecycle::Fulfilled(UserProfile::new(
            uid("u1"),
            "Ada",
            "ada@example.com",
        ))))
}

#[rstest]
fn pending_sets_loading_and_clears_previous_error() {
    let state = ApplicationState::default()
        .reduce(Transition::SignIn(Lifecycle::Rejected(Error::backend("Wrong Password"))))
        .reduce(Transition::SignIn(Lifecycle::Pending));
    assert!(state.user.loading);
    assert!(state.user.last_error.is_none());
}

#[rstest]
fn sign_in_fulfilled_authenticates(signed_in: ApplicationState) {
    assert!(signed_in.is_authenticated());
    assert_eq!(signed_in.current_user_id(), Some(&uid("u1")));
    assert!(!signed_in.user.loading);
}

#[rstest]
fn sign_in_rejection_keeps_prior_profile() {
    let profile = UserProfile::new(uid("u1"), "Ada", "ada@example.com");
    let state = ApplicationState::default()
        .reduce(Transition::ProfileUpdate(Lifecycle::Fulfilled(profile.clone())))
        .reduce(Transition::SignIn(Lifecycle::Pending))
        .reduce(Transition::SignIn(Lifecycle::Rejected(Error::backend("User not Found"))));
    assert!(!state.is_authenticated());
    assert_eq!(state.profile(), Some(&profile));
    assert_eq!(
        state.user.last_error.as_ref().map(Error::message),
        Some("User not Found")
    );
}

#[rstest]
fn profile_fetch_rejection_demotes_user(signed_in: ApplicationState) {
    let state = signed_in.reduce(Transition::ProfileFetch(Lifecycle::Rejected(
        Error::backend("unavailable"),
    )));
    assert!(!state.is_authenticated());
    assert!(state.profile().is_none());
    assert_eq!(state.current_user_id(), None);
}

#[rstest]
fn absent_profile_document_keeps_partial_profile(signed_in: ApplicationState) {
    let state = signed_in.reduce(Transition::ProfileFetch(Lifecycle::Fulfilled(None)));
    assert!(state.is_authenticated());
    assert_eq!(state.profile().map(|p| p.email.as_str()), Some("ada@example.com"));
}

#[rstest]
fn logout_resets_user_slice_and_session(signed_in: ApplicationState) {
    let state = signed_in.reduce(Transition::Logout);
    assert_eq!(state.user, UserSlice::default());
    assert_eq!(state.session, Session::anonymous());
}

#[rstest]
fn reset_user_keeps_authenticated_flag(signed_in: ApplicationState) {
    let state = signed_in.reduce(Transition::ResetUser);
    assert!(state.is_authenticated());
    assert!(state.profile().is_none());
}

#[rstest]
fn listing_loaded_bumps_revision_and_refreshes_current() {
    let stale = project("p1", &[]);
    let state = ApplicationState::default()
        .reduce(Transition::CurrentProject(Some(stale)))
        .reduce(Transition::ListingLoaded(vec![project("p1", &["u2"])]));
    assert!(state.projects.listing_loaded);
    assert_eq!(state.projects.listing_revision, 1);
    assert_eq!(state.projects.current.as_ref().map(Project::like_count), Some(1));
}

#[rstest]
fn like_applied_is_provisional_until_next_listing() {
    let state = ApplicationState::default()
        .reduce(Transition::ListingLoaded(vec![project("p1", &["u2"])]))
        .reduce(Transition::LikeApplied {
            project: ProjectId::new("p1"),
            user: uid("u1"),
            liked: true,
        });
    let id = ProjectId::new("p1");
    assert_eq!(state.listed_project(&id).map(Project::like_count), Some(2));
    assert_eq!(state.projects.listing_revision, 2);

    let state = state.reduce(Transition::ListingLoaded(vec![project("p1", &["u2"])]));
    assert_eq!(state.listed_project(&id).map(Project::like_count), Some(1));
}

#[rstest]
fn like_applied_for_unknown_project_is_ignored() {
    let state = ApplicationState::default().reduce(Transition::LikeApplied {
        project: ProjectId::new("missing"),
        user: uid("u1"),
        liked: true,
    });
    assert_eq!(state.projects.listing_revision, 0);
}

#[rstest]
fn project_save_fulfilled_upserts_listing() {
    let state = ApplicationState::default()
        .reduce(Transition::ListingLoaded(vec![project("p1", &[])]))
        .reduce(Transition::ProjectSave(Lifecycle::Pending))
        .reduce(Transition::ProjectSave(Lifecycle::Fulfilled(project("p2", &[]))));
    assert!(!state.projects.loading);
    assert_eq!(state.projects.listing.len(), 2);
    assert_eq!(
        state.projects.current.as_ref().and_then(|p| p.id.clone()),
        Some(ProjectId::new("p2"))
    );
}

#[rstest]
fn project_save_rejection_records_error() {
    let state = ApplicationState::default()
        .reduce(Transition::ProjectSave(Lifecycle::Pending))
        .reduce(Transition::ProjectSave(Lifecycle::Rejected(Error::backend("denied"))));
    assert!(!state.projects.loading);
    assert!(state.projects.last_error.is_some());
}

#[rstest]
#[case(Transition::SignIn(Lifecycle::Pending), "sign_in", Some("pending"))]
#[case(Transition::ProfileFetch(Lifecycle::Fulfilled(None)), "profile_fetch", Some("fulfilled"))]
#[case(Transition::Logout, "logout", None)]
fn transitions_report_log_labels(
    #[case] transition: Transition,
    #[case] name: &str,
    #[case] phase: Option<&str>,
) {
    assert_eq!(transition.name(), name);
    assert_eq!(transition.phase(), phase);
}

#[rstest]
fn state_serialises_with_camel_case_keys(signed_in: ApplicationState) {
    let value = serde_json::to_value(&signed_in).expect("state serialises");
    assert_eq!(value["user"]["authenticated"], true);
    assert_eq!(value["projects"]["listingLoaded"], false);
    assert_eq!(value["session"]["userId"], "u1");
}
