//! Case proposals offered to student teams, and their reaction votes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{BriefOf, EntityId, Record};

/// Maximum length of a case title.
pub const MAX_TITLE_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// Reaction bucket a voter can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reaction {
    Neutral,
    Positive,
    Negative,
}

/// A user who reacted to a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub user_id: EntityId,
    pub name: Option<String>,
}

impl Voter {
    pub fn new(user_id: EntityId, name: Option<String>) -> Self {
        Self { user_id, name }
    }
}

/// The three reaction buckets of a case.
///
/// A user id appears in at most one bucket. [`VoteSet::cast`] is the only
/// mutation and preserves that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSet {
    #[serde(default)]
    pub neutral: Vec<Voter>,
    #[serde(default)]
    pub positive: Vec<Voter>,
    #[serde(default)]
    pub negative: Vec<Voter>,
}

/// Bucket sizes of a [`VoteSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub neutral: usize,
    pub positive: usize,
    pub negative: usize,
}

impl VoteTally {
    pub fn total(&self) -> usize {
        self.neutral + self.positive + self.negative
    }
}

impl VoteSet {
    /// Remove `voter` from every bucket, then add it to the bucket for
    /// `reaction`. `None` clears the vote.
    ///
    /// Repeating the same call yields the same state.
    pub fn cast(&mut self, voter: Voter, reaction: Option<Reaction>) {
        for bucket in [&mut self.neutral, &mut self.positive, &mut self.negative] {
            bucket.retain(|v| v.user_id != voter.user_id);
        }
        if let Some(reaction) = reaction {
            self.bucket_mut(reaction).push(voter);
        }
    }

    /// Which bucket, if any, holds `user_id`.
    pub fn reaction_of(&self, user_id: EntityId) -> Option<Reaction> {
        [Reaction::Neutral, Reaction::Positive, Reaction::Negative]
            .into_iter()
            .find(|r| self.bucket(*r).iter().any(|v| v.user_id == user_id))
    }

    pub fn bucket(&self, reaction: Reaction) -> &[Voter] {
        match reaction {
            Reaction::Neutral => &self.neutral,
            Reaction::Positive => &self.positive,
            Reaction::Negative => &self.negative,
        }
    }

    fn bucket_mut(&mut self, reaction: Reaction) -> &mut Vec<Voter> {
        match reaction {
            Reaction::Neutral => &mut self.neutral,
            Reaction::Positive => &mut self.positive,
            Reaction::Negative => &mut self.negative,
        }
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally {
            neutral: self.neutral.len(),
            positive: self.positive.len(),
            negative: self.negative.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Full case record returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub goal: String,
    pub expected_result: String,
    pub criteria: String,
    pub tutor_id: Option<EntityId>,
    pub tutor_name: Option<String>,
    pub max_teams: i32,
    pub accepted_teams: i32,
    pub is_active: bool,
    #[serde(default)]
    pub votes: VoteSet,
}

/// Abbreviated case projection used in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBrief {
    pub id: EntityId,
    pub title: String,
    pub tutor_name: Option<String>,
    pub max_teams: i32,
    pub accepted_teams: i32,
    pub is_active: bool,
    #[serde(default)]
    pub votes: VoteSet,
}

/// Team capacity headroom. Negative when more teams were accepted than the
/// case allows.
pub fn spots_left(max_teams: i32, accepted_teams: i32) -> i32 {
    max_teams - accepted_teams
}

impl Case {
    pub fn spots_left(&self) -> i32 {
        spots_left(self.max_teams, self.accepted_teams)
    }

    /// Apply a partial update. Fields absent from the patch are untouched.
    pub fn apply_patch(&mut self, patch: &CasePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(goal) = &patch.goal {
            self.goal = goal.clone();
        }
        if let Some(expected) = &patch.expected_result {
            self.expected_result = expected.clone();
        }
        if let Some(criteria) = &patch.criteria {
            self.criteria = criteria.clone();
        }
        if let Some(max_teams) = patch.max_teams {
            self.max_teams = max_teams;
        }
    }
}

impl CaseBrief {
    pub fn spots_left(&self) -> i32 {
        spots_left(self.max_teams, self.accepted_teams)
    }
}

impl Record for Case {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Record for CaseBrief {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl BriefOf<Case> for CaseBrief {
    fn brief_of(full: &Case) -> Self {
        CaseBrief {
            id: full.id,
            title: full.title.clone(),
            tutor_name: full.tutor_name.clone(),
            max_teams: full.max_teams,
            accepted_teams: full.accepted_teams,
            is_active: full.is_active,
            votes: full.votes.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCase {
    pub title: String,
    pub description: String,
    pub goal: String,
    pub expected_result: String,
    pub criteria: String,
    pub tutor_id: Option<EntityId>,
    pub max_teams: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CasePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_teams: Option<i32>,
}

/// Body of the vote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub user_id: EntityId,
    pub name: Option<String>,
    pub reaction: Reaction,
}

/// Body of the case activation endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActiveFlag {
    pub is_active: bool,
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Case title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Case title too long: {} chars (max {MAX_TITLE_LEN})",
            title.len()
        )));
    }
    Ok(())
}

fn validate_capacity(max_teams: i32) -> Result<(), CoreError> {
    if max_teams < 1 {
        return Err(CoreError::Validation(format!(
            "Case capacity must be at least 1 team, got {max_teams}"
        )));
    }
    Ok(())
}

impl NewCase {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)?;
        if self.goal.trim().is_empty() {
            return Err(CoreError::Validation(
                "Case goal must not be empty".to_string(),
            ));
        }
        validate_capacity(self.max_teams)
    }
}

impl CasePatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(max_teams) = self.max_teams {
            validate_capacity(max_teams)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Voter {
        Voter::new(1, Some("Alice".to_string()))
    }

    fn buckets_holding(votes: &VoteSet, user_id: EntityId) -> usize {
        [Reaction::Neutral, Reaction::Positive, Reaction::Negative]
            .into_iter()
            .filter(|r| votes.bucket(*r).iter().any(|v| v.user_id == user_id))
            .count()
    }

    #[test]
    fn cast_moves_voter_between_buckets() {
        let mut votes = VoteSet::default();
        votes.cast(alice(), Some(Reaction::Positive));
        assert_eq!(votes.reaction_of(1), Some(Reaction::Positive));

        votes.cast(alice(), Some(Reaction::Negative));
        assert_eq!(votes.reaction_of(1), Some(Reaction::Negative));
        assert!(votes.positive.is_empty());
    }

    #[test]
    fn cast_none_clears_vote() {
        let mut votes = VoteSet::default();
        votes.cast(alice(), Some(Reaction::Positive));
        votes.cast(alice(), None);
        assert_eq!(votes.reaction_of(1), None);
        assert_eq!(votes.tally().total(), 0);
    }

    #[test]
    fn cast_repairs_duplicated_prior_state() {
        let mut votes = VoteSet {
            neutral: vec![alice()],
            positive: vec![alice()],
            negative: vec![alice()],
        };
        votes.cast(alice(), Some(Reaction::Neutral));
        assert_eq!(buckets_holding(&votes, 1), 1);
        assert_eq!(votes.neutral.len(), 1);
    }

    #[test]
    fn any_vote_sequence_keeps_single_bucket_per_user() {
        let reactions = [
            Some(Reaction::Positive),
            Some(Reaction::Negative),
            None,
            Some(Reaction::Neutral),
            Some(Reaction::Neutral),
            Some(Reaction::Positive),
        ];
        let mut votes = VoteSet::default();
        for (i, reaction) in reactions.iter().enumerate() {
            let user_id = (i % 2) as EntityId + 1;
            votes.cast(Voter::new(user_id, None), *reaction);
            for uid in [1, 2] {
                assert!(buckets_holding(&votes, uid) <= 1);
            }
        }
    }

    #[test]
    fn repeated_cast_is_idempotent() {
        let mut once = VoteSet::default();
        once.cast(alice(), Some(Reaction::Positive));

        let mut twice = once.clone();
        twice.cast(alice(), Some(Reaction::Positive));

        assert_eq!(once, twice);
    }

    #[test]
    fn other_voters_are_preserved() {
        let mut votes = VoteSet::default();
        votes.cast(Voter::new(2, None), Some(Reaction::Positive));
        votes.cast(alice(), Some(Reaction::Positive));
        votes.cast(alice(), Some(Reaction::Negative));
        assert_eq!(
            votes.tally(),
            VoteTally {
                neutral: 0,
                positive: 1,
                negative: 1
            }
        );
    }

    #[test]
    fn spots_left_is_not_clamped() {
        assert_eq!(spots_left(2, 3), -1);
        assert_eq!(spots_left(4, 1), 3);
    }

    #[test]
    fn zero_capacity_rejected() {
        let case = NewCase {
            title: "Edge caching".to_string(),
            description: String::new(),
            goal: "Reduce latency".to_string(),
            expected_result: String::new(),
            criteria: String::new(),
            tutor_id: None,
            max_teams: 0,
        };
        assert!(case.validate().is_err());
    }

    #[test]
    fn votes_default_when_missing_from_payload() {
        let json = serde_json::json!({
            "id": 3,
            "title": "t",
            "tutor_name": null,
            "max_teams": 2,
            "accepted_teams": 0,
            "is_active": true
        });
        let brief: CaseBrief = serde_json::from_value(json).unwrap();
        assert_eq!(brief.votes, VoteSet::default());
    }
}
