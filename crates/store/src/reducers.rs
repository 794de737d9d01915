//! Local mutations applied to containers ahead of, or instead of, a backend
//! round trip.
//!
//! Each optimistic reducer returns a snapshot of what it replaced so the
//! caller can roll back when the backend rejects the change.

use collab_core::case::{Case, CaseBrief, Reaction, VoteSet, Voter};
use collab_core::error::CoreError;
use collab_core::milestone::{self, Milestone, MilestoneStatus};
use collab_core::types::{EntityId, Timestamp};

use crate::container::EntityContainer;

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// Vote sets of one case as they were before an optimistic vote.
#[derive(Debug, Clone)]
pub struct VoteSnapshot {
    pub case_id: EntityId,
    list: Option<VoteSet>,
    current: Option<VoteSet>,
}

/// Apply `voter`'s reaction to the case in both the list and the current
/// slot. `None` withdraws the vote.
pub fn cast_vote(
    cases: &mut EntityContainer<CaseBrief, Case>,
    case_id: EntityId,
    voter: &Voter,
    reaction: Option<Reaction>,
) -> VoteSnapshot {
    let list = cases.item_mut(case_id).map(|brief| {
        let before = brief.votes.clone();
        brief.votes.cast(voter.clone(), reaction);
        before
    });
    let current = cases.current_mut(case_id).map(|case| {
        let before = case.votes.clone();
        case.votes.cast(voter.clone(), reaction);
        before
    });
    VoteSnapshot {
        case_id,
        list,
        current,
    }
}

/// Put back the vote sets captured by [`cast_vote`].
pub fn restore_votes(cases: &mut EntityContainer<CaseBrief, Case>, snapshot: VoteSnapshot) {
    if let (Some(votes), Some(brief)) = (snapshot.list, cases.item_mut(snapshot.case_id)) {
        brief.votes = votes;
    }
    if let (Some(votes), Some(case)) = (snapshot.current, cases.current_mut(snapshot.case_id)) {
        case.votes = votes;
    }
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// Copies of a milestone from the list and the current slot.
#[derive(Debug, Clone)]
pub struct MilestoneSnapshot {
    pub id: EntityId,
    list: Option<Milestone>,
    current: Option<Milestone>,
}

/// Apply `edit` to the list entry and the current record. A rejected edit
/// leaves both as they were.
fn edit_milestone(
    milestones: &mut EntityContainer<Milestone>,
    id: EntityId,
    edit: impl Fn(&mut Milestone) -> Result<(), CoreError>,
) -> Result<Option<MilestoneSnapshot>, CoreError> {
    let mut snapshot = MilestoneSnapshot {
        id,
        list: None,
        current: None,
    };
    if let Some(m) = milestones.item_mut(id) {
        let before = m.clone();
        edit(m)?;
        snapshot.list = Some(before);
    }
    if let Some(m) = milestones.current_mut(id) {
        let before = m.clone();
        if let Err(e) = edit(m) {
            restore_milestone(milestones, snapshot);
            return Err(e);
        }
        snapshot.current = Some(before);
    }
    if snapshot.list.is_none() && snapshot.current.is_none() {
        return Ok(None);
    }
    Ok(Some(snapshot))
}

/// Set a milestone's progress and derive its status. `Ok(None)` if the
/// milestone is not held anywhere in the container.
pub fn set_milestone_progress(
    milestones: &mut EntityContainer<Milestone>,
    id: EntityId,
    progress: i32,
    now: Timestamp,
) -> Result<Option<MilestoneSnapshot>, CoreError> {
    edit_milestone(milestones, id, |m| {
        m.set_progress(progress, now);
        Ok(())
    })
}

pub fn set_milestone_status(
    milestones: &mut EntityContainer<Milestone>,
    id: EntityId,
    status: MilestoneStatus,
    now: Timestamp,
) -> Result<Option<MilestoneSnapshot>, CoreError> {
    edit_milestone(milestones, id, |m| m.set_status(status, now))
}

pub fn restore_milestone(milestones: &mut EntityContainer<Milestone>, snapshot: MilestoneSnapshot) {
    if let (Some(before), Some(m)) = (snapshot.list, milestones.item_mut(snapshot.id)) {
        *m = before;
    }
    if let (Some(before), Some(m)) = (snapshot.current, milestones.current_mut(snapshot.id)) {
        *m = before;
    }
}

/// Mark every past-due milestone in the container as overdue, as of `now`.
///
/// Returns the number of list entries that changed. The current slot is
/// swept too but not counted separately.
pub fn sweep_overdue_milestones(
    milestones: &mut EntityContainer<Milestone>,
    now: Timestamp,
) -> usize {
    let changed = milestone::sweep_overdue(&mut milestones.items, now);
    if let Some(current) = milestones.current.as_mut() {
        milestone::sweep_overdue(std::slice::from_mut(current), now);
    }
    changed
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use collab_core::milestone::{MilestoneKind, MilestonePriority};

    use super::*;

    fn case_brief(id: EntityId) -> CaseBrief {
        CaseBrief {
            id,
            title: "Chatbot".to_string(),
            tutor_name: None,
            max_teams: 2,
            accepted_teams: 0,
            is_active: true,
            votes: VoteSet::default(),
        }
    }

    fn milestone(id: EntityId, target: NaiveDate, status: MilestoneStatus) -> Milestone {
        let created = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap();
        Milestone {
            id,
            title: format!("Milestone {id}"),
            description: None,
            kind: MilestoneKind::Global,
            project_id: None,
            target_date: target,
            status,
            priority: MilestonePriority::Medium,
            progress: 0,
            assignee: None,
            dependencies: vec![],
            created_at: created,
            updated_at: created,
            completed_at: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn vote_moves_user_between_buckets_and_restores() {
        let mut cases = EntityContainer::with_items(vec![case_brief(1)]);
        let voter = Voter::new(7, None);

        cast_vote(&mut cases, 1, &voter, Some(Reaction::Positive));
        let snapshot = cast_vote(&mut cases, 1, &voter, Some(Reaction::Negative));

        let votes = &cases.items()[0].votes;
        assert!(votes.positive.is_empty());
        assert_eq!(votes.negative.len(), 1);

        restore_votes(&mut cases, snapshot);
        assert_eq!(cases.items()[0].votes.reaction_of(7), Some(Reaction::Positive));
    }

    #[test]
    fn vote_on_unknown_case_changes_nothing() {
        let mut cases = EntityContainer::with_items(vec![case_brief(1)]);
        cast_vote(&mut cases, 2, &Voter::new(7, None), Some(Reaction::Neutral));
        assert_eq!(cases.items()[0].votes.tally().total(), 0);
    }

    #[test]
    fn full_progress_completes_milestone() {
        let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
        let pending = milestone(1, day(2024, 12, 1), MilestoneStatus::Pending);
        let mut milestones = EntityContainer::with_items(vec![pending]);

        set_milestone_progress(&mut milestones, 1, 100, now).unwrap().unwrap();
        let m = &milestones.items()[0];
        assert_eq!(m.status, MilestoneStatus::Completed);
        assert_eq!(m.completed_at, Some(now));
    }

    #[test]
    fn progress_on_missing_milestone_is_none() {
        let now = Utc::now();
        let mut milestones: EntityContainer<Milestone> = EntityContainer::default();
        assert!(set_milestone_progress(&mut milestones, 5, 40, now).unwrap().is_none());
    }

    #[test]
    fn restore_undoes_status_change() {
        let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
        let pending = milestone(1, day(2024, 12, 1), MilestoneStatus::Pending);
        let mut milestones = EntityContainer::with_items(vec![pending]);

        let snapshot = set_milestone_status(&mut milestones, 1, MilestoneStatus::Completed, now)
            .unwrap()
            .unwrap();
        assert_eq!(milestones.items()[0].progress, 100);

        restore_milestone(&mut milestones, snapshot);
        assert_eq!(milestones.items()[0].status, MilestoneStatus::Pending);
        assert_eq!(milestones.items()[0].progress, 0);
    }

    #[test]
    fn rejected_status_leaves_list_and_current_alone() {
        let now = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
        let pending = milestone(1, day(2024, 12, 1), MilestoneStatus::Pending);
        let mut milestones = EntityContainer::with_items(vec![pending.clone()]);
        milestones.select_succeeded(pending.clone());

        let result = set_milestone_status(&mut milestones, 1, MilestoneStatus::Overdue, now);
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(milestones.items()[0], pending);
        assert_eq!(milestones.current(), Some(&pending));
    }

    #[test]
    fn sweep_marks_past_due_only() {
        let now = Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap();
        let mut milestones = EntityContainer::with_items(vec![
            milestone(1, day(2024, 10, 30), MilestoneStatus::InProgress),
            milestone(2, day(2024, 10, 30), MilestoneStatus::Completed),
            milestone(3, day(2024, 11, 1), MilestoneStatus::Pending),
        ]);

        assert_eq!(sweep_overdue_milestones(&mut milestones, now), 1);
        let statuses: Vec<_> = milestones.items().iter().map(|m| m.status).collect();
        assert_eq!(
            statuses,
            vec![MilestoneStatus::Overdue, MilestoneStatus::Completed, MilestoneStatus::Pending]
        );
        assert_eq!(sweep_overdue_milestones(&mut milestones, now), 0);
    }
}
