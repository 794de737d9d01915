//! Deterministic fallback dataset served by [`MockBackend`](crate::mock::MockBackend).

use chrono::NaiveDate;
use uuid::Uuid;

use collab_core::application::{Application, ApplicationStatus, Message, MessageDirection};
use collab_core::case::{Case, VoteSet, Voter};
use collab_core::meeting::{Meeting, TodoTask};
use collab_core::milestone::{Milestone, MilestoneKind, MilestonePriority, MilestoneStatus};
use collab_core::project::{Project, ProjectStatus, SEMESTER_CODE_AUTUMN, SEMESTER_CODE_SPRING};
use collab_core::types::{EntityId, Timestamp};
use collab_core::user::{UserProfile, UserRole};

use crate::mock::MockData;

/// First id handed out for records created against the mock.
pub const FIRST_GENERATED_ID: EntityId = 100;

/// Seed dates are built in const context, so a bad literal fails the build.
const fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => date,
        None => panic!("invalid seed date"),
    }
}

const fn at(y: i32, m: u32, d: u32, hour: u32, min: u32) -> Timestamp {
    match day(y, m, d).and_hms_opt(hour, min, 0) {
        Some(naive) => naive.and_utc(),
        None => panic!("invalid seed time"),
    }
}

fn task(n: u128, title: &str, done: bool) -> TodoTask {
    TodoTask {
        id: Uuid::from_u128(n),
        title: title.to_string(),
        is_completed: done,
    }
}

fn message(
    id: EntityId,
    content: &str,
    sent_at: Timestamp,
    read: bool,
    dir: MessageDirection,
) -> Message {
    Message {
        id,
        content: content.to_string(),
        sent_at,
        is_read: read,
        direction: dir,
    }
}

fn voter(users: &[UserProfile], id: EntityId) -> Voter {
    let name = users.iter().find(|u| u.id == id).map(|u| u.full_name.clone());
    Voter::new(id, name)
}

pub fn users() -> Vec<UserProfile> {
    let user = |id, name: &str, role, telegram: Option<&str>| UserProfile {
        id,
        full_name: name.to_string(),
        role,
        telegram: telegram.map(str::to_string),
    };
    vec![
        user(1, "Irina Volkova", UserRole::Curator, Some("@ivolkova")),
        user(2, "Pavel Smirnov", UserRole::Tutor, Some("@psmirnov")),
        user(3, "Olga Petrova", UserRole::Tutor, None),
        user(4, "Maxim Orlov", UserRole::Student, Some("@morlov")),
        user(5, "Anna Lebedeva", UserRole::Admin, None),
    ]
}

fn project(id: EntityId, title: &str, team: &str, semester: i16, year: i32) -> Project {
    Project {
        id,
        title: title.to_string(),
        description: format!("{title} built by team {team}."),
        team_name: team.to_string(),
        meeting_link: Some(format!("https://meet.example.org/project-{id}")),
        status: ProjectStatus::Created,
        semester,
        year,
        tutor_id: None,
        tutor_name: None,
    }
}

fn tutored(mut project: Project, status: ProjectStatus, tutor: (EntityId, &str)) -> Project {
    project.status = status;
    project.tutor_id = Some(tutor.0);
    project.tutor_name = Some(tutor.1.to_string());
    project
}

pub fn projects() -> Vec<Project> {
    let pavel = (2, "Pavel Smirnov");
    let olga = (3, "Olga Petrova");
    vec![
        tutored(
            project(1, "Campus navigation app", "Pathfinders", SEMESTER_CODE_AUTUMN, 2024),
            ProjectStatus::InWork,
            pavel,
        ),
        tutored(
            project(2, "Supply chain dashboard", "Logistix", SEMESTER_CODE_SPRING, 2024),
            ProjectStatus::Created,
            olga,
        ),
        tutored(
            project(3, "Warehouse robot simulator", "RoboRats", SEMESTER_CODE_AUTUMN, 2023),
            ProjectStatus::Completed,
            pavel,
        ),
        Project {
            status: ProjectStatus::InWork,
            ..project(4, "Energy usage analytics", "Watts Up", SEMESTER_CODE_SPRING, 2025)
        },
    ]
}

pub fn meetings() -> Vec<Meeting> {
    vec![
        Meeting {
            id: 1,
            project_id: 1,
            scheduled_at: const { at(2024, 9, 20, 10, 0) },
            notes: "Kick-off, scope agreed.".to_string(),
            is_completed: true,
            mark: 7,
            tasks: vec![
                task(0x101, "Draft requirements", true),
                task(0x102, "Set up repository", false),
                task(0x103, "Interview stakeholders", false),
            ],
        },
        Meeting {
            id: 2,
            project_id: 1,
            scheduled_at: const { at(2024, 10, 4, 10, 0) },
            notes: "Repository ready, mockups pending.".to_string(),
            is_completed: true,
            mark: 8,
            tasks: vec![
                task(0x201, "Set up repository", true),
                task(0x202, "Prepare UI mockups", false),
            ],
        },
        Meeting {
            id: 3,
            project_id: 2,
            scheduled_at: const { at(2024, 10, 10, 15, 0) },
            notes: String::new(),
            is_completed: false,
            mark: 0,
            tasks: vec![task(0x301, "Collect sample data", false)],
        },
        Meeting {
            id: 4,
            project_id: 4,
            scheduled_at: const { at(2025, 3, 12, 12, 0) },
            notes: String::new(),
            is_completed: false,
            mark: 0,
            tasks: vec![],
        },
    ]
}

pub fn cases(users: &[UserProfile]) -> Vec<Case> {
    vec![
        Case {
            id: 1,
            title: "Predictive maintenance for conveyors".to_string(),
            description: "Forecast conveyor failures from vibration telemetry.".to_string(),
            goal: "Cut unplanned downtime".to_string(),
            expected_result: "Prototype model with a monitoring dashboard".to_string(),
            criteria: "Precision on held-out failures, demo quality".to_string(),
            tutor_id: Some(2),
            tutor_name: Some("Pavel Smirnov".to_string()),
            max_teams: 2,
            accepted_teams: 1,
            is_active: true,
            votes: VoteSet {
                neutral: vec![voter(users, 5)],
                positive: vec![voter(users, 1)],
                negative: vec![],
            },
        },
        Case {
            id: 2,
            title: "Chatbot for admissions office".to_string(),
            description: "Answer applicant questions from the admissions FAQ.".to_string(),
            goal: "Reduce email load on the admissions office".to_string(),
            expected_result: "Deployed chatbot on the university site".to_string(),
            criteria: "Answer accuracy, response time".to_string(),
            tutor_id: Some(3),
            tutor_name: Some("Olga Petrova".to_string()),
            max_teams: 2,
            accepted_teams: 3,
            is_active: true,
            votes: VoteSet {
                neutral: vec![],
                positive: vec![voter(users, 1), voter(users, 5)],
                negative: vec![],
            },
        },
        Case {
            id: 3,
            title: "Legacy ERP migration study".to_string(),
            description: "Assess migration paths off a legacy ERP.".to_string(),
            goal: "Migration roadmap".to_string(),
            expected_result: "Written report".to_string(),
            criteria: "Depth of analysis".to_string(),
            tutor_id: None,
            tutor_name: None,
            max_teams: 1,
            accepted_teams: 0,
            is_active: false,
            votes: VoteSet::default(),
        },
    ]
}

pub fn applications() -> Vec<Application> {
    use MessageDirection::{FromReviewer, FromTeam};
    vec![
        Application {
            id: 1,
            case_id: 1,
            case_title: "Predictive maintenance for conveyors".to_string(),
            team_title: "Pathfinders".to_string(),
            telegram: Some("@pathfinders".to_string()),
            status: ApplicationStatus::New,
            updated_at: const { at(2024, 10, 1, 9, 30) },
            messages: vec![message(
                1,
                "We would like to take this case.",
                const { at(2024, 10, 1, 9, 30) },
                false,
                FromTeam,
            )],
        },
        Application {
            id: 2,
            case_id: 1,
            case_title: "Predictive maintenance for conveyors".to_string(),
            team_title: "Gear Heads".to_string(),
            telegram: Some("@gearheads".to_string()),
            status: ApplicationStatus::MeetPlanned,
            updated_at: const { at(2024, 10, 3, 14, 0) },
            messages: vec![
                message(
                    2,
                    "Is the telemetry data available already?",
                    const { at(2024, 10, 2, 11, 0) },
                    true,
                    FromTeam,
                ),
                message(
                    3,
                    "Yes, let's meet on Thursday.",
                    const { at(2024, 10, 3, 14, 0) },
                    true,
                    FromReviewer,
                ),
            ],
        },
        Application {
            id: 3,
            case_id: 2,
            case_title: "Chatbot for admissions office".to_string(),
            team_title: "Byte Club".to_string(),
            telegram: None,
            status: ApplicationStatus::Accepted,
            updated_at: const { at(2024, 9, 28, 16, 45) },
            messages: vec![],
        },
        Application {
            id: 4,
            case_id: 2,
            case_title: "Chatbot for admissions office".to_string(),
            team_title: "Null Pointers".to_string(),
            telegram: Some("@nullptr".to_string()),
            status: ApplicationStatus::Rejected,
            updated_at: const { at(2024, 9, 30, 10, 15) },
            messages: vec![message(
                4,
                "Could you reconsider our application?",
                const { at(2024, 10, 5, 8, 0) },
                false,
                FromTeam,
            )],
        },
    ]
}

/// A pending, medium-priority global milestone with no dependencies.
fn milestone(id: EntityId, title: &str, target_date: NaiveDate) -> Milestone {
    let created = const { at(2024, 9, 1, 8, 0) };
    Milestone {
        id,
        title: title.to_string(),
        description: None,
        kind: MilestoneKind::Global,
        project_id: None,
        target_date,
        status: MilestoneStatus::Pending,
        priority: MilestonePriority::Medium,
        progress: 0,
        assignee: None,
        dependencies: vec![],
        created_at: created,
        updated_at: created,
        completed_at: None,
    }
}

pub fn milestones() -> Vec<Milestone> {
    vec![
        Milestone {
            status: MilestoneStatus::Completed,
            priority: MilestonePriority::High,
            progress: 100,
            completed_at: Some(const { at(2024, 9, 14, 17, 0) }),
            ..milestone(1, "Project topics approved", const { day(2024, 9, 15) })
        },
        Milestone {
            status: MilestoneStatus::InProgress,
            priority: MilestonePriority::Critical,
            progress: 60,
            dependencies: vec![1],
            ..milestone(2, "Mid-term review", const { day(2024, 11, 20) })
        },
        Milestone {
            kind: MilestoneKind::Local,
            project_id: Some(1),
            assignee: Some("Pathfinders".to_string()),
            dependencies: vec![2],
            ..milestone(3, "MVP demo", const { day(2024, 12, 10) })
        },
        Milestone {
            kind: MilestoneKind::Local,
            project_id: Some(2),
            status: MilestoneStatus::InProgress,
            priority: MilestonePriority::High,
            progress: 30,
            ..milestone(4, "Data pipeline ready", const { day(2024, 10, 30) })
        },
        Milestone {
            priority: MilestonePriority::Critical,
            dependencies: vec![2, 3],
            ..milestone(5, "Final defense", const { day(2025, 6, 20) })
        },
    ]
}

/// The full seeded dataset.
pub fn dataset() -> MockData {
    let users = users();
    MockData {
        projects: projects(),
        meetings: meetings(),
        cases: cases(&users),
        applications: applications(),
        milestones: milestones(),
        users,
        next_id: FIRST_GENERATED_ID,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn seed_milestones_keep_completion_invariant() {
        for m in milestones() {
            assert_eq!(m.progress == 100, m.status == MilestoneStatus::Completed, "{}", m.id);
            assert_eq!(m.completed_at.is_some(), m.status == MilestoneStatus::Completed);
        }
    }

    #[test]
    fn seed_timestamps_are_utc_literals() {
        let topics = &milestones()[0];
        assert_eq!(
            topics.completed_at,
            Some(Utc.with_ymd_and_hms(2024, 9, 14, 17, 0, 0).unwrap())
        );
        assert_eq!(meetings()[1].scheduled_at.to_rfc3339(), "2024-10-04T10:00:00+00:00");
    }

    #[test]
    fn untutored_project_has_no_tutor_name() {
        let projects = projects();
        assert_eq!(projects[0].tutor_name.as_deref(), Some("Pavel Smirnov"));
        assert_eq!(projects[3].status, ProjectStatus::InWork);
        assert!(projects[3].tutor_id.is_none() && projects[3].tutor_name.is_none());
    }
}
