//! Search and categorical filtering.

use collab_core::application::{ApplicationBrief, ApplicationStatus};
use collab_core::case::CaseBrief;
use collab_core::meeting::Meeting;
use collab_core::milestone::{Milestone, MilestoneKind, MilestonePriority, MilestoneStatus};
use collab_core::project::{ProjectBrief, ProjectStatus, Semester};
use collab_core::types::EntityId;

// ---------------------------------------------------------------------------
// Free-text search
// ---------------------------------------------------------------------------

/// Records that expose text fields to free-text search.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

/// Case-insensitive substring match of `query` against any search field.
///
/// A blank query matches everything.
pub fn matches_search<T: Searchable + ?Sized>(item: &T, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    item.search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

impl Searchable for ProjectBrief {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.team_name.as_str()];
        fields.extend(self.tutor_name.as_deref());
        fields.extend(self.semester_label().map(Semester::label));
        fields
    }
}

impl Searchable for Milestone {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.description.as_deref());
        fields.extend(self.assignee.as_deref());
        fields
    }
}

impl Searchable for ApplicationBrief {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.team_title.as_str(), self.case_title.as_str()];
        fields.extend(self.telegram.as_deref());
        fields
    }
}

impl Searchable for CaseBrief {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.tutor_name.as_deref());
        fields
    }
}

impl Searchable for Meeting {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.notes.as_str()];
        fields.extend(self.tasks.iter().map(|t| t.title.as_str()));
        fields
    }
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// A conjunction of criteria over records of type `T`.
pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    /// Items that satisfy every criterion, in input order.
    fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Empty set means "any".
fn in_set<S: PartialEq>(set: &[S], value: &S) -> bool {
    set.is_empty() || set.contains(value)
}

fn equals<V: PartialEq>(wanted: &Option<V>, value: &V) -> bool {
    wanted.as_ref().map_or(true, |w| w == value)
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub search: String,
    pub statuses: Vec<ProjectStatus>,
    pub semester: Option<Semester>,
    pub year: Option<i32>,
}

impl Filter<ProjectBrief> for ProjectFilter {
    fn matches(&self, p: &ProjectBrief) -> bool {
        matches_search(p, &self.search)
            && in_set(&self.statuses, &p.status)
            && self.semester.map_or(true, |s| p.semester_label() == Some(s))
            && equals(&self.year, &p.year)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MilestoneFilter {
    pub search: String,
    pub statuses: Vec<MilestoneStatus>,
    pub priorities: Vec<MilestonePriority>,
    pub kind: Option<MilestoneKind>,
    pub project_id: Option<EntityId>,
}

impl Filter<Milestone> for MilestoneFilter {
    fn matches(&self, m: &Milestone) -> bool {
        matches_search(m, &self.search)
            && in_set(&self.statuses, &m.status)
            && in_set(&self.priorities, &m.priority)
            && equals(&self.kind, &m.kind)
            && self.project_id.map_or(true, |id| m.project_id == Some(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub search: String,
    pub statuses: Vec<ApplicationStatus>,
    pub case_id: Option<EntityId>,
    pub unread_only: bool,
}

impl Filter<ApplicationBrief> for ApplicationFilter {
    fn matches(&self, a: &ApplicationBrief) -> bool {
        matches_search(a, &self.search)
            && in_set(&self.statuses, &a.status)
            && equals(&self.case_id, &a.case_id)
            && (!self.unread_only || a.unread_count > 0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub search: String,
    pub is_active: Option<bool>,
    /// Only cases that can still take a team.
    pub with_spots: bool,
}

impl Filter<CaseBrief> for CaseFilter {
    fn matches(&self, c: &CaseBrief) -> bool {
        matches_search(c, &self.search)
            && equals(&self.is_active, &c.is_active)
            && (!self.with_spots || c.spots_left() > 0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    pub search: String,
    pub project_id: Option<EntityId>,
    pub is_completed: Option<bool>,
}

impl Filter<Meeting> for MeetingFilter {
    fn matches(&self, m: &Meeting) -> bool {
        matches_search(m, &self.search)
            && equals(&self.project_id, &m.project_id)
            && equals(&self.is_completed, &m.is_completed)
    }
}

#[cfg(test)]
mod tests {
    use collab_core::project::{SEMESTER_CODE_AUTUMN, SEMESTER_CODE_SPRING};

    use super::*;

    fn project(id: EntityId, title: &str, semester: i16, status: ProjectStatus) -> ProjectBrief {
        ProjectBrief {
            id,
            title: title.to_string(),
            team_name: format!("Team {id}"),
            status,
            semester,
            year: 2024,
            tutor_name: None,
        }
    }

    fn sample() -> Vec<ProjectBrief> {
        vec![
            project(1, "Campus navigation", SEMESTER_CODE_AUTUMN, ProjectStatus::InWork),
            project(2, "Supply chain", SEMESTER_CODE_SPRING, ProjectStatus::Created),
            project(3, "Robot simulator", SEMESTER_CODE_AUTUMN, ProjectStatus::Completed),
        ]
    }

    #[test]
    fn blank_search_is_identity() {
        let items = sample();
        for query in ["", "   "] {
            let filter = ProjectFilter {
                search: query.to_string(),
                ..Default::default()
            };
            let ids: Vec<_> = filter.apply(&items).iter().map(|p| p.id).collect();
            assert_eq!(ids, vec![1, 2, 3]);
        }
    }

    #[test]
    fn search_is_case_insensitive() {
        let filter = ProjectFilter {
            search: "ROBOT".to_string(),
            ..Default::default()
        };
        let projects = sample();
        let hits = filter.apply(&projects);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 3);
    }

    #[test]
    fn semester_label_is_searchable() {
        let filter = ProjectFilter {
            search: "autumn".to_string(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&sample()).len(), 2);
    }

    #[test]
    fn criteria_are_conjunctive() {
        let filter = ProjectFilter {
            semester: Some(Semester::Autumn),
            statuses: vec![ProjectStatus::Completed],
            ..Default::default()
        };
        let projects = sample();
        let hits = filter.apply(&projects);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 3);
    }

    #[test]
    fn unknown_semester_code_never_matches_a_label() {
        let items = vec![project(9, "Odd", 7, ProjectStatus::Created)];
        let filter = ProjectFilter {
            semester: Some(Semester::Spring),
            ..Default::default()
        };
        assert!(filter.apply(&items).is_empty());
    }
}
