//! Milestones: global or project-local goals with progress tracking.
//!
//! The completion and overdue invariants are maintained here, by the
//! mutation functions, not by storage:
//!
//! - `progress == 100` implies `status == Completed`, and `completed_at` is
//!   set only while the milestone is completed.
//! - `Overdue` requires the target date to have passed. [`sweep_overdue`]
//!   assigns it in bulk when callers run it; nothing re-evaluates it in the
//!   background.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Record, Timestamp};

/// Progress value at which a milestone counts as completed.
pub const PROGRESS_COMPLETE: i32 = 100;

/// Maximum length of a milestone title.
pub const MAX_TITLE_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Global,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl MilestoneStatus {
    pub const ALL: [MilestoneStatus; 4] = [
        MilestoneStatus::Pending,
        MilestoneStatus::InProgress,
        MilestoneStatus::Completed,
        MilestoneStatus::Overdue,
    ];

    /// Sort rank: pending < in_progress < completed < overdue.
    pub fn rank(self) -> u8 {
        match self {
            MilestoneStatus::Pending => 0,
            MilestoneStatus::InProgress => 1,
            MilestoneStatus::Completed => 2,
            MilestoneStatus::Overdue => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestonePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl MilestonePriority {
    /// Sort rank: low < medium < high < critical.
    pub fn rank(self) -> u8 {
        match self {
            MilestonePriority::Low => 0,
            MilestonePriority::Medium => 1,
            MilestonePriority::High => 2,
            MilestonePriority::Critical => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub kind: MilestoneKind,
    /// Owning project; present iff `kind` is `Local`.
    pub project_id: Option<EntityId>,
    pub target_date: NaiveDate,
    pub status: MilestoneStatus,
    pub priority: MilestonePriority,
    /// Percentage, nominally `0..=100`. Not clamped.
    pub progress: i32,
    pub assignee: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<EntityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Record for Milestone {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Milestone {
    /// Set progress and derive the status from it.
    ///
    /// `100` completes the milestone and any other positive value marks it
    /// in progress. `0` leaves the status untouched, except that a completed
    /// milestone is reopened as pending. The value is stored as given; range
    /// checks belong to the caller.
    pub fn set_progress(&mut self, progress: i32, now: Timestamp) {
        self.progress = progress;
        if progress == PROGRESS_COMPLETE {
            self.status = MilestoneStatus::Completed;
            self.completed_at = Some(now);
        } else {
            if progress > 0 {
                self.status = MilestoneStatus::InProgress;
            } else if self.status == MilestoneStatus::Completed {
                self.status = MilestoneStatus::Pending;
            }
            self.completed_at = None;
        }
        self.updated_at = now;
    }

    /// Set the status directly. Completing fills progress and stamps
    /// `completed_at`; any other status clears the stamp and drops a full
    /// progress back to `0`. `Overdue` needs a target date before today;
    /// nothing changes when the status is rejected.
    pub fn set_status(&mut self, status: MilestoneStatus, now: Timestamp) -> Result<(), CoreError> {
        check_status_for(self.id, self.target_date, status, now)?;
        self.status = status;
        if status == MilestoneStatus::Completed {
            self.progress = PROGRESS_COMPLETE;
            self.completed_at = Some(now);
        } else {
            if self.progress >= PROGRESS_COMPLETE {
                self.progress = 0;
            }
            self.completed_at = None;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Whether the target date has passed without completion, as of `now`.
    pub fn is_past_due(&self, now: Timestamp) -> bool {
        self.status != MilestoneStatus::Completed && self.target_date < now.date_naive()
    }

    /// Apply a partial update. Fields absent from the patch are untouched.
    /// A rejected status leaves the whole record unchanged.
    pub fn apply_patch(&mut self, patch: &MilestonePatch, now: Timestamp) -> Result<(), CoreError> {
        if let Some(status) = patch.status {
            let target_date = patch.target_date.unwrap_or(self.target_date);
            check_status_for(self.id, target_date, status, now)?;
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(date) = patch.target_date {
            self.target_date = date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = Some(assignee.clone());
        }
        if let Some(deps) = &patch.dependencies {
            self.dependencies = deps.clone();
        }
        if let Some(status) = patch.status {
            self.set_status(status, now)?;
        }
        if let Some(progress) = patch.progress {
            self.set_progress(progress, now);
        }
        self.updated_at = now;
        Ok(())
    }
}

fn check_status_for(
    id: EntityId,
    target_date: NaiveDate,
    status: MilestoneStatus,
    now: Timestamp,
) -> Result<(), CoreError> {
    if status == MilestoneStatus::Overdue && target_date >= now.date_naive() {
        return Err(CoreError::Validation(format!(
            "Milestone {id} is not past its target date {target_date}"
        )));
    }
    Ok(())
}

/// Point-in-time batch correction: mark every non-completed milestone whose
/// target date is before `now`'s date as overdue.
///
/// Returns the number of milestones whose status changed.
pub fn sweep_overdue(milestones: &mut [Milestone], now: Timestamp) -> usize {
    let mut changed = 0;
    for m in milestones.iter_mut() {
        if m.is_past_due(now) && m.status != MilestoneStatus::Overdue {
            m.status = MilestoneStatus::Overdue;
            m.updated_at = now;
            changed += 1;
        }
    }
    changed
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMilestone {
    pub title: String,
    pub description: Option<String>,
    pub kind: MilestoneKind,
    pub project_id: Option<EntityId>,
    pub target_date: NaiveDate,
    pub priority: MilestonePriority,
    pub assignee: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<EntityId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilestonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MilestoneStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<MilestonePriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<EntityId>>,
}

/// Validate kind/project consistency: local milestones need a project,
/// global ones must not have one.
pub fn validate_kind_project_consistency(
    kind: MilestoneKind,
    project_id: Option<EntityId>,
) -> Result<(), CoreError> {
    match (kind, project_id) {
        (MilestoneKind::Local, None) => Err(CoreError::Validation(
            "Local milestone requires a project_id".to_string(),
        )),
        (MilestoneKind::Global, Some(_)) => Err(CoreError::Validation(
            "Global milestone must not have a project_id".to_string(),
        )),
        _ => Ok(()),
    }
}

impl NewMilestone {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(
                "Milestone title must not be empty".to_string(),
            ));
        }
        if self.title.len() > MAX_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "Milestone title too long: {} chars (max {MAX_TITLE_LEN})",
                self.title.len()
            )));
        }
        validate_kind_project_consistency(self.kind, self.project_id)
    }

    /// Materialize the record a backend would store for this payload.
    pub fn into_milestone(self, id: EntityId, now: Timestamp) -> Milestone {
        Milestone {
            id,
            title: self.title,
            description: self.description,
            kind: self.kind,
            project_id: self.project_id,
            target_date: self.target_date,
            status: MilestoneStatus::Pending,
            priority: self.priority,
            progress: 0,
            assignee: self.assignee,
            dependencies: self.dependencies,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}
