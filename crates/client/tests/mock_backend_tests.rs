//! Integration tests for the in-memory [`MockBackend`].

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};

use collab_client::seed::FIRST_GENERATED_ID;
use collab_client::{Backend, ClientError, MockBackend};
use collab_core::application::{ApplicationStatus, NewMessage};
use collab_core::case::{Reaction, Voter};
use collab_core::error::CoreError;
use collab_core::meeting::{carry_over_draft, MeetingPatch};
use collab_core::milestone::{
    MilestoneKind, MilestonePatch, MilestonePriority, MilestoneStatus, NewMilestone,
};
use collab_core::project::{NewProject, ProjectStatus};

fn backend() -> MockBackend {
    MockBackend::seeded(Duration::ZERO)
}

#[tokio::test]
async fn seeded_lists_are_deterministic() {
    let api = backend();
    assert_eq!(api.list_projects().await.unwrap().len(), 4);
    assert_eq!(api.list_cases().await.unwrap().len(), 3);
    assert_eq!(api.list_applications().await.unwrap().len(), 4);
    assert_eq!(api.list_milestones().await.unwrap().len(), 5);
    assert_eq!(api.list_meetings(None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn tutors_exclude_students_and_admins() {
    let tutors = backend().list_tutors().await.unwrap();
    assert!(tutors.iter().all(|u| u.role.can_supervise()));
    assert_eq!(tutors.len(), 3);
}

#[tokio::test]
async fn meetings_filter_by_project() {
    let meetings = backend().list_meetings(Some(1)).await.unwrap();
    assert_eq!(meetings.len(), 2);
    assert!(meetings.iter().all(|m| m.project_id == 1));
}

#[tokio::test]
async fn get_absent_record_is_not_found() {
    let err = backend().get_case(999).await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::NotFound { entity: "Case", id: 999 }));
}

#[tokio::test]
async fn create_assigns_server_ids() {
    let api = backend();
    let input = NewProject {
        title: "Smart parking".to_string(),
        description: String::new(),
        team_name: "Park Rangers".to_string(),
        meeting_link: None,
        semester: 2,
        year: 2025,
        tutor_id: Some(3),
    };
    let first = api.create_project(&input).await.unwrap();
    let second = api.create_project(&input).await.unwrap();

    assert_eq!(first.id, FIRST_GENERATED_ID);
    assert_eq!(second.id, FIRST_GENERATED_ID + 1);
    assert_eq!(first.status, ProjectStatus::Created);
    assert_eq!(first.tutor_name.as_deref(), Some("Olga Petrova"));
    assert_eq!(api.list_projects().await.unwrap().len(), 6);
}

#[tokio::test]
async fn student_cannot_be_assigned_as_tutor() {
    let err = backend().assign_tutor(1, Some(4)).await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn tutor_assignment_can_be_cleared() {
    let project = backend().assign_tutor(1, None).await.unwrap();
    assert_eq!(project.tutor_id, None);
    assert_eq!(project.tutor_name, None);
}

#[tokio::test]
async fn votes_persist_between_reads() {
    let api = backend();
    let voter = Voter::new(4, Some("Maxim Orlov".to_string()));

    api.vote_case(1, &voter, Reaction::Negative).await.unwrap();
    let case = api.get_case(1).await.unwrap();
    assert_eq!(case.votes.reaction_of(4), Some(Reaction::Negative));

    api.unvote_case(1, &voter).await.unwrap();
    let case = api.get_case(1).await.unwrap();
    assert_eq!(case.votes.reaction_of(4), None);
}

#[tokio::test]
async fn message_send_returns_updated_thread() {
    let api = backend();
    let before = api.get_application(1).await.unwrap().messages.len();
    let app = api
        .send_message(
            1,
            &NewMessage {
                content: "Let's meet on Monday".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(app.messages.len(), before + 1);

    let app = api.mark_messages_read(1).await.unwrap();
    assert_eq!(app.unread_count(), 0);
}

#[tokio::test]
async fn status_transition_stamps_update() {
    let api = backend();
    let before = Utc::now();
    let app = api
        .set_application_status(1, ApplicationStatus::MeetPlanned)
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::MeetPlanned);
    assert!(app.updated_at >= before);
}

#[tokio::test]
async fn local_milestone_requires_existing_project() {
    let api = backend();
    let input = NewMilestone {
        title: "Usability test".to_string(),
        description: None,
        kind: MilestoneKind::Local,
        project_id: Some(404),
        target_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        priority: MilestonePriority::Low,
        assignee: None,
        dependencies: vec![],
    };
    let err = api.create_milestone(&input).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn milestone_progress_patch_completes() {
    let api = backend();
    let m = api
        .update_milestone(
            2,
            &MilestonePatch {
                progress: Some(100),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(m.status, MilestoneStatus::Completed);
    assert!(m.completed_at.is_some());
}

#[tokio::test]
async fn overdue_patch_needs_past_target_date() {
    let api = backend();
    let patch = MilestonePatch {
        target_date: Some(NaiveDate::from_ymd_opt(2999, 1, 1).unwrap()),
        status: Some(MilestoneStatus::Overdue),
        ..Default::default()
    };
    let err = api.update_milestone(3, &patch).await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Validation(_)));

    let stored = api.get_milestone(3).await.unwrap();
    assert_eq!(stored.status, MilestoneStatus::Pending);
    assert_eq!(stored.target_date, NaiveDate::from_ymd_opt(2024, 12, 10).unwrap());
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let api = backend();
    api.delete_meeting(3).await.unwrap();
    assert!(api.get_meeting(3).await.unwrap_err().is_not_found());
    assert!(api.delete_meeting(3).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn invalid_mark_rejected_before_update() {
    let err = backend()
        .update_meeting(
            1,
            &MeetingPatch {
                mark: Some(12),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn carried_over_meeting_can_be_created() {
    let api = backend();
    let meetings = api.list_meetings(Some(1)).await.unwrap();
    let draft = carry_over_draft(&meetings, 1, Utc::now());

    let titles: Vec<_> = draft.tasks.iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, vec!["Prepare UI mockups".to_string()]);

    let created = api.create_meeting(&draft).await.unwrap();
    assert_eq!(created.tasks.len(), 1);
    assert!(!created.tasks[0].is_completed);
}

#[tokio::test]
async fn latency_is_applied() {
    let api = MockBackend::seeded(Duration::from_millis(20));
    let started = std::time::Instant::now();
    api.list_projects().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn injected_failure_fires_once() {
    let api = backend();
    api.fail_next("list_cases", 503, "maintenance").await;

    let err = api.list_cases().await.unwrap_err();
    assert_matches!(err, ClientError::Api { status: 503, ref message } if message == "maintenance");
    assert_eq!(api.list_cases().await.unwrap().len(), 3);
}
