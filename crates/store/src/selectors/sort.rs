//! Stable, direction-aware sorting with fixed key sets per entity.
//!
//! Every sort accepts a slice of owned records or of references, so filter
//! output (`Vec<&T>`) can be sorted without cloning.

use std::borrow::Borrow;
use std::cmp::Ordering;

use collab_core::application::ApplicationBrief;
use collab_core::case::CaseBrief;
use collab_core::meeting::Meeting;
use collab_core::milestone::Milestone;
use collab_core::project::ProjectBrief;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Sort `items` by `compare` in `direction`.
///
/// Equal elements keep their input order in both directions.
pub fn sort_with<T, P, C>(items: &mut [P], direction: SortDirection, compare: C)
where
    P: Borrow<T>,
    C: Fn(&T, &T) -> Ordering,
{
    items.sort_by(|a, b| direction.apply(compare(a.borrow(), b.borrow())));
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSortKey {
    Title,
    TeamName,
    Status,
    /// Year, then semester code.
    Term,
}

pub fn sort_projects<P: Borrow<ProjectBrief>>(
    items: &mut [P],
    key: ProjectSortKey,
    direction: SortDirection,
) {
    sort_with(items, direction, |a: &ProjectBrief, b: &ProjectBrief| match key {
        ProjectSortKey::Title => compare_text(&a.title, &b.title),
        ProjectSortKey::TeamName => compare_text(&a.team_name, &b.team_name),
        ProjectSortKey::Status => a.status.cmp(&b.status),
        ProjectSortKey::Term => (a.year, a.semester).cmp(&(b.year, b.semester)),
    });
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneSortKey {
    TargetDate,
    Title,
    /// pending < in_progress < completed < overdue
    Status,
    /// low < medium < high < critical
    Priority,
    Progress,
}

pub fn sort_milestones<P: Borrow<Milestone>>(
    items: &mut [P],
    key: MilestoneSortKey,
    direction: SortDirection,
) {
    sort_with(items, direction, |a: &Milestone, b: &Milestone| match key {
        MilestoneSortKey::TargetDate => a.target_date.cmp(&b.target_date),
        MilestoneSortKey::Title => compare_text(&a.title, &b.title),
        MilestoneSortKey::Status => a.status.rank().cmp(&b.status.rank()),
        MilestoneSortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
        MilestoneSortKey::Progress => a.progress.cmp(&b.progress),
    });
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationSortKey {
    UpdatedAt,
    TeamTitle,
    Status,
    Unread,
}

pub fn sort_applications<P: Borrow<ApplicationBrief>>(
    items: &mut [P],
    key: ApplicationSortKey,
    direction: SortDirection,
) {
    sort_with(items, direction, |a: &ApplicationBrief, b: &ApplicationBrief| match key {
        ApplicationSortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        ApplicationSortKey::TeamTitle => compare_text(&a.team_title, &b.team_title),
        ApplicationSortKey::Status => a.status.cmp(&b.status),
        ApplicationSortKey::Unread => a.unread_count.cmp(&b.unread_count),
    });
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSortKey {
    Title,
    SpotsLeft,
    /// Total reactions across all buckets.
    Votes,
    Positive,
}

pub fn sort_cases<P: Borrow<CaseBrief>>(
    items: &mut [P],
    key: CaseSortKey,
    direction: SortDirection,
) {
    sort_with(items, direction, |a: &CaseBrief, b: &CaseBrief| match key {
        CaseSortKey::Title => compare_text(&a.title, &b.title),
        CaseSortKey::SpotsLeft => a.spots_left().cmp(&b.spots_left()),
        CaseSortKey::Votes => a.votes.tally().total().cmp(&b.votes.tally().total()),
        CaseSortKey::Positive => a.votes.positive.len().cmp(&b.votes.positive.len()),
    });
}

// ---------------------------------------------------------------------------
// Meetings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingSortKey {
    ScheduledAt,
    Mark,
    OpenTasks,
}

pub fn sort_meetings<P: Borrow<Meeting>>(
    items: &mut [P],
    key: MeetingSortKey,
    direction: SortDirection,
) {
    sort_with(items, direction, |a: &Meeting, b: &Meeting| match key {
        MeetingSortKey::ScheduledAt => a.scheduled_at.cmp(&b.scheduled_at),
        MeetingSortKey::Mark => a.mark.cmp(&b.mark),
        MeetingSortKey::OpenTasks => a
            .incomplete_tasks()
            .count()
            .cmp(&b.incomplete_tasks().count()),
    });
}
