//! Regression coverage for project validation and wire format.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn owner() -> UserId {
    UserId::new("owner-1").expect("owner id")
}

#[fixture]
fn valid_draft() -> ProjectDraft {
    ProjectDraft {
        id: None,
        thumbnail: "https://cdn.example/thumb.png".to_owned(),
        title: "Rusty Board".to_owned(),
        overview: "A kanban board".to_owned(),
        github: "https://github.com/example/rusty-board".to_owned(),
        link: String::new(),
        points: vec!["Drag and drop".to_owned(), "Offline drafts".to_owned()],
        likers: BTreeSet::new(),
    }
}

#[rstest]
fn valid_draft_builds_project(valid_draft: ProjectDraft, owner: UserId) {
    let project = valid_draft.validate(owner.clone()).expect("valid project");
    assert_eq!(project.owner, owner);
    assert_eq!(project.points.len(), 2);
    assert!(project.link.is_none());
    assert_eq!(project.like_count(), 0);
}

#[rstest]
#[case::one_point(vec!["only"], ProjectValidationError::TooFewPoints { min: 2 })]
#[case::one_filled_one_blank(vec!["only", "  "], ProjectValidationError::TooFewPoints { min: 2 })]
#[case::no_points(vec!["", ""], ProjectValidationError::MissingDescription)]
#[case::blank_among_three(vec!["a", "", "c"], ProjectValidationError::BlankPoint)]
#[case::six_points(vec!["a", "b", "c", "d", "e", "f"], ProjectValidationError::TooManyPoints { max: 5 })]
fn description_points_outside_bounds_are_rejected(
    mut valid_draft: ProjectDraft,
    owner: UserId,
    #[case] points: Vec<&str>,
    #[case] expected: ProjectValidationError,
) {
    valid_draft.points = points.into_iter().map(str::to_owned).collect();
    let err = valid_draft.validate(owner).expect_err("points must be rejected");
    assert_eq!(err, expected);
    assert_eq!(err.field(), "points");
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(5)]
fn accepted_points_stay_within_bounds(
    mut valid_draft: ProjectDraft,
    owner: UserId,
    #[case] count: usize,
) {
    valid_draft.points = (0..count).map(|index| format!(" point {index} ")).collect();
    let project = valid_draft.validate(owner).expect("valid project");
    assert!((MIN_DESCRIPTION_POINTS..=MAX_DESCRIPTION_POINTS).contains(&project.points.len()));
    assert!(project.points.iter().all(|point| !point.is_empty()));
    assert_eq!(project.points.first().map(String::as_str), Some("point 0"));
}

#[rstest]
fn missing_thumbnail_is_reported_first(owner: UserId) {
    let err = ProjectDraft::default()
        .validate(owner)
        .expect_err("empty form");
    assert_eq!(err, ProjectValidationError::MissingThumbnail);
    assert_eq!(err.to_string(), "photo for project is required");
}

#[rstest]
#[case::bad_repository("not a url", "", "github")]
#[case::bad_link("https://github.com/x/y", "example dot com", "link")]
fn malformed_links_are_rejected(
    mut valid_draft: ProjectDraft,
    owner: UserId,
    #[case] github: &str,
    #[case] link: &str,
    #[case] field: &str,
) {
    valid_draft.github = github.to_owned();
    valid_draft.link = link.to_owned();
    let err = valid_draft.validate(owner).expect_err("invalid url");
    assert_eq!(err.to_string(), "Invalid URL");
    assert_eq!(err.field(), field);
}

#[rstest]
fn add_point_stops_at_maximum() {
    let mut draft = ProjectDraft::default();
    while draft.add_point() {}
    assert_eq!(draft.points.len(), MAX_DESCRIPTION_POINTS);
    assert!(!draft.add_point());
}

#[rstest]
fn editing_preserves_likers(valid_draft: ProjectDraft, owner: UserId) {
    let mut project = valid_draft.validate(owner.clone()).expect("valid project");
    project.id = Some(ProjectId::new("p1"));
    project.likers.insert(UserId::new("fan").expect("fan id"));

    let mut draft = ProjectDraft::from_project(&project);
    draft.title = "Renamed".to_owned();
    let edited = draft.validate(owner).expect("edit is valid");

    assert_eq!(edited.id, Some(ProjectId::new("p1")));
    assert_eq!(edited.like_count(), 1);
    assert_eq!(edited.title, "Renamed");
}

#[rstest]
fn wire_format_uses_document_field_names() {
    let value = json!({
        "pid": "p1",
        "title": "T",
        "overview": "O",
        "thumbnail": "https://cdn.example/t.png",
        "github": "https://github.com/x/y",
        "points": ["a", "b"],
        "likes": ["u2", "u1", "u2"],
        "refUser": "u1",
    });
    let project: Project = serde_json::from_value(value).expect("document decodes");

    assert_eq!(project.id, Some(ProjectId::new("p1")));
    assert_eq!(project.like_count(), 2);
    assert!(project.is_liked_by(&UserId::new("u1").expect("id")));
    assert!(project.is_owned_by(&UserId::new("u1").expect("id")));
}
