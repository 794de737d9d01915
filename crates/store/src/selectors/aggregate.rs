//! Counts, groupings and the dashboard summary.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use collab_core::application::{ApplicationBrief, ApplicationStatus};
use collab_core::case::{CaseBrief, VoteTally};
use collab_core::milestone::{Milestone, MilestoneStatus};
use collab_core::project::{ProjectBrief, Semester};
use collab_core::types::{EntityId, Timestamp};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SemesterCounts {
    pub autumn: usize,
    pub spring: usize,
    /// Projects whose semester code has no label.
    pub unknown: usize,
}

pub fn semester_counts<P: Borrow<ProjectBrief>>(projects: &[P]) -> SemesterCounts {
    projects
        .iter()
        .fold(SemesterCounts::default(), |mut counts, p| {
            match p.borrow().semester_label() {
                Some(Semester::Autumn) => counts.autumn += 1,
                Some(Semester::Spring) => counts.spring += 1,
                None => counts.unknown += 1,
            }
            counts
        })
}

/// Projects of one academic term.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterGroup<'a> {
    pub year: i32,
    pub semester: Option<Semester>,
    pub projects: Vec<&'a ProjectBrief>,
}

/// Group projects by (year, semester), ordered by year then semester code.
/// Input order is kept within a group.
pub fn group_by_semester(projects: &[ProjectBrief]) -> Vec<SemesterGroup<'_>> {
    let mut groups: BTreeMap<(i32, i16), Vec<&ProjectBrief>> = BTreeMap::new();
    for p in projects {
        groups.entry((p.year, p.semester)).or_default().push(p);
    }
    groups
        .into_iter()
        .map(|((year, code), projects)| SemesterGroup {
            year,
            semester: Semester::from_code(code),
            projects,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

/// Applications per status. Every status is present, zero if unused.
pub fn application_status_counts<A: Borrow<ApplicationBrief>>(
    applications: &[A],
) -> BTreeMap<ApplicationStatus, usize> {
    let mut counts: BTreeMap<ApplicationStatus, usize> =
        ApplicationStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for a in applications {
        *counts.entry(a.borrow().status).or_default() += 1;
    }
    counts
}

pub fn unread_total<A: Borrow<ApplicationBrief>>(applications: &[A]) -> usize {
    applications.iter().map(|a| a.borrow().unread_count).sum()
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

/// Reactions summed over all cases.
pub fn vote_totals<C: Borrow<CaseBrief>>(cases: &[C]) -> VoteTally {
    cases.iter().fold(VoteTally::default(), |mut total, c| {
        let tally = c.borrow().votes.tally();
        total.neutral += tally.neutral;
        total.positive += tally.positive;
        total.negative += tally.negative;
        total
    })
}

/// Cases that accepted more teams than they offer.
pub fn oversubscribed_cases(cases: &[CaseBrief]) -> Vec<&CaseBrief> {
    cases.iter().filter(|c| c.spots_left() < 0).collect()
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// Milestones past their target date and not completed, as of `now`.
///
/// Derived from dates only; stored statuses are not consulted or changed.
pub fn overdue_milestones(milestones: &[Milestone], now: Timestamp) -> Vec<&Milestone> {
    milestones.iter().filter(|m| m.is_past_due(now)).collect()
}

/// Unfinished milestones with at least one unfinished dependency.
///
/// Dependencies that are not in `milestones` are not known to be
/// unfinished and do not block.
pub fn blocked_milestones(milestones: &[Milestone]) -> Vec<&Milestone> {
    let status: HashMap<EntityId, MilestoneStatus> =
        milestones.iter().map(|m| (m.id, m.status)).collect();
    milestones
        .iter()
        .filter(|m| m.status != MilestoneStatus::Completed)
        .filter(|m| {
            m.dependencies
                .iter()
                .any(|dep| status.get(dep).is_some_and(|s| *s != MilestoneStatus::Completed))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MilestoneStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    /// Mean of stored progress values; `0.0` when there are none.
    pub average_progress: f64,
}

pub fn milestone_stats<M: Borrow<Milestone>>(milestones: &[M]) -> MilestoneStats {
    let mut stats = MilestoneStats::default();
    let mut progress_sum: i64 = 0;
    for m in milestones {
        let m = m.borrow();
        stats.total += 1;
        progress_sum += i64::from(m.progress);
        match m.status {
            MilestoneStatus::Pending => stats.pending += 1,
            MilestoneStatus::InProgress => stats.in_progress += 1,
            MilestoneStatus::Completed => stats.completed += 1,
            MilestoneStatus::Overdue => stats.overdue += 1,
        }
    }
    if stats.total > 0 {
        stats.average_progress = progress_sum as f64 / stats.total as f64;
    }
    stats
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Everything the landing page shows, computed from one state snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub generated_at: Timestamp,
    pub projects: usize,
    pub semesters: SemesterCounts,
    pub applications: BTreeMap<ApplicationStatus, usize>,
    pub unread_messages: usize,
    pub active_cases: usize,
    pub oversubscribed_cases: Vec<EntityId>,
    pub votes: VoteTally,
    pub milestones: MilestoneStats,
    pub overdue_milestones: Vec<EntityId>,
    pub blocked_milestones: Vec<EntityId>,
    pub upcoming_meetings: usize,
    /// `"<entity>: <error>"` for every container whose last request failed.
    pub errors: Vec<String>,
}

pub fn dashboard_summary(state: &AppState, now: Timestamp) -> DashboardSummary {
    let projects = state.projects.items();
    let cases = state.cases.items();
    let milestones = state.milestones.items();

    DashboardSummary {
        generated_at: now,
        projects: projects.len(),
        semesters: semester_counts(projects),
        applications: application_status_counts(state.applications.items()),
        unread_messages: unread_total(state.applications.items()),
        active_cases: cases.iter().filter(|c| c.is_active).count(),
        oversubscribed_cases: oversubscribed_cases(cases).iter().map(|c| c.id).collect(),
        votes: vote_totals(cases),
        milestones: milestone_stats(milestones),
        overdue_milestones: overdue_milestones(milestones, now).iter().map(|m| m.id).collect(),
        blocked_milestones: blocked_milestones(milestones).iter().map(|m| m.id).collect(),
        upcoming_meetings: state
            .meetings
            .items()
            .iter()
            .filter(|m| !m.is_completed && m.scheduled_at >= now)
            .count(),
        errors: state
            .errors()
            .into_iter()
            .map(|(entity, error)| format!("{entity}: {error}"))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use collab_core::case::{Reaction, VoteSet, Voter};
    use collab_core::milestone::{MilestoneKind, MilestonePriority};
    use collab_core::project::{ProjectStatus, SEMESTER_CODE_AUTUMN, SEMESTER_CODE_SPRING};

    use super::*;

    fn project(id: EntityId, semester: i16, year: i32) -> ProjectBrief {
        ProjectBrief {
            id,
            title: format!("Project {id}"),
            team_name: format!("Team {id}"),
            status: ProjectStatus::InWork,
            semester,
            year,
            tutor_name: None,
        }
    }

    fn milestone(
        id: EntityId,
        status: MilestoneStatus,
        progress: i32,
        deps: Vec<EntityId>,
    ) -> Milestone {
        let created = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap();
        Milestone {
            id,
            title: format!("Milestone {id}"),
            description: None,
            kind: MilestoneKind::Global,
            project_id: None,
            target_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            status,
            priority: MilestonePriority::Medium,
            progress,
            assignee: None,
            dependencies: deps,
            created_at: created,
            updated_at: created,
            completed_at: None,
        }
    }

    #[test]
    fn semester_counts_include_unknown_codes() {
        let projects = vec![
            project(1, SEMESTER_CODE_AUTUMN, 2024),
            project(2, SEMESTER_CODE_SPRING, 2024),
            project(3, 0, 2024),
        ];
        assert_eq!(
            semester_counts(&projects),
            SemesterCounts {
                autumn: 1,
                spring: 1,
                unknown: 1
            }
        );
    }

    #[test]
    fn groups_are_ordered_by_term() {
        let projects = vec![
            project(1, SEMESTER_CODE_SPRING, 2025),
            project(2, SEMESTER_CODE_AUTUMN, 2024),
            project(3, SEMESTER_CODE_SPRING, 2025),
        ];
        let groups = group_by_semester(&projects);
        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].year, groups[0].semester), (2024, Some(Semester::Autumn)));
        let ids: Vec<_> = groups[1].projects.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn status_counts_cover_every_status() {
        let counts = application_status_counts::<ApplicationBrief>(&[]);
        assert_eq!(counts.len(), ApplicationStatus::ALL.len());
        assert!(counts.values().all(|n| *n == 0));
    }

    #[test]
    fn oversubscribed_case_has_negative_spots() {
        let case = CaseBrief {
            id: 2,
            title: "Chatbot".to_string(),
            tutor_name: None,
            max_teams: 2,
            accepted_teams: 3,
            is_active: true,
            votes: VoteSet::default(),
        };
        assert_eq!(case.spots_left(), -1);
        assert_eq!(oversubscribed_cases(std::slice::from_ref(&case)).len(), 1);
    }

    #[test]
    fn vote_totals_sum_buckets() {
        let mut votes = VoteSet::default();
        votes.cast(Voter::new(1, None), Some(Reaction::Positive));
        votes.cast(Voter::new(2, None), Some(Reaction::Negative));
        let case = CaseBrief {
            id: 1,
            title: "Case".to_string(),
            tutor_name: None,
            max_teams: 1,
            accepted_teams: 0,
            is_active: true,
            votes,
        };
        let total = vote_totals(&[case.clone(), case]);
        assert_eq!(total.positive, 2);
        assert_eq!(total.negative, 2);
        assert_eq!(total.total(), 4);
    }

    #[test]
    fn overdue_detection_does_not_mutate() {
        let now = Utc.with_ymd_and_hms(2024, 10, 2, 0, 0, 0).unwrap();
        let milestones = vec![
            milestone(1, MilestoneStatus::InProgress, 40, vec![]),
            milestone(2, MilestoneStatus::Completed, 100, vec![]),
        ];
        let overdue = overdue_milestones(&milestones, now);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, 1);
        assert_eq!(milestones[0].status, MilestoneStatus::InProgress);
    }

    #[test]
    fn blocked_by_unfinished_dependency_only() {
        let milestones = vec![
            milestone(1, MilestoneStatus::Completed, 100, vec![]),
            milestone(2, MilestoneStatus::InProgress, 50, vec![1]),
            milestone(3, MilestoneStatus::Pending, 0, vec![2]),
            milestone(4, MilestoneStatus::Pending, 0, vec![99]),
        ];
        let blocked: Vec<_> = blocked_milestones(&milestones).iter().map(|m| m.id).collect();
        assert_eq!(blocked, vec![3]);
    }

    #[test]
    fn stats_average_progress() {
        let milestones = vec![
            milestone(1, MilestoneStatus::Completed, 100, vec![]),
            milestone(2, MilestoneStatus::InProgress, 50, vec![]),
        ];
        let stats = milestone_stats(&milestones);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert!((stats.average_progress - 75.0).abs() < f64::EPSILON);
        assert_eq!(milestone_stats::<Milestone>(&[]).average_progress, 0.0);
    }
}
