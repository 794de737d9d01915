//! Project meetings, their to-do tasks and carry-over drafts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{EntityId, Record, Timestamp};

/// Lowest result mark a meeting can receive.
pub const MIN_MARK: i16 = 0;

/// Highest result mark a meeting can receive.
pub const MAX_MARK: i16 = 10;

/// A to-do item owned by exactly one meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoTask {
    pub id: Uuid,
    pub title: String,
    pub is_completed: bool,
}

impl TodoTask {
    /// A fresh, incomplete task with a locally generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: EntityId,
    pub project_id: EntityId,
    pub scheduled_at: Timestamp,
    pub notes: String,
    pub is_completed: bool,
    /// Result mark in `0..=10`.
    pub mark: i16,
    pub tasks: Vec<TodoTask>,
}

impl Record for Meeting {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Meeting {
    pub fn incomplete_tasks(&self) -> impl Iterator<Item = &TodoTask> {
        self.tasks.iter().filter(|t| !t.is_completed)
    }

    /// Apply a partial update. Fields absent from the patch are untouched.
    pub fn apply_patch(&mut self, patch: &MeetingPatch) {
        if let Some(at) = patch.scheduled_at {
            self.scheduled_at = at;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(done) = patch.is_completed {
            self.is_completed = done;
        }
        if let Some(mark) = patch.mark {
            self.mark = mark;
        }
        if let Some(tasks) = &patch.tasks {
            self.tasks = tasks.clone();
        }
    }

    /// Flip the completion flag of one task. Returns `false` if the task
    /// does not belong to this meeting.
    pub fn toggle_task(&mut self, task_id: Uuid) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.is_completed = !task.is_completed;
                true
            }
            None => false,
        }
    }
}

/// Payload for creating a meeting. Also used as the editable draft that a
/// carry-over pre-seeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub project_id: EntityId,
    pub scheduled_at: Timestamp,
    pub notes: String,
    pub is_completed: bool,
    pub mark: i16,
    pub tasks: Vec<TodoTask>,
}

impl NewMeeting {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_mark(self.mark)?;
        validate_tasks(&self.tasks)
    }
}

/// Partial update for a meeting. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TodoTask>>,
}

impl MeetingPatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(mark) = self.mark {
            validate_mark(mark)?;
        }
        if let Some(tasks) = &self.tasks {
            validate_tasks(tasks)?;
        }
        Ok(())
    }
}

/// Validate that a result mark is within `MIN_MARK..=MAX_MARK`.
pub fn validate_mark(mark: i16) -> Result<(), CoreError> {
    if (MIN_MARK..=MAX_MARK).contains(&mark) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Meeting mark {mark} out of range ({MIN_MARK}-{MAX_MARK})"
        )))
    }
}

fn validate_tasks(tasks: &[TodoTask]) -> Result<(), CoreError> {
    if tasks.iter().any(|t| t.title.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Task title must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Carry-over
// ---------------------------------------------------------------------------

/// The most recent meeting of a project by scheduled date-time.
///
/// When two meetings share the latest timestamp, the one appearing first in
/// `meetings` wins.
pub fn latest_meeting(meetings: &[Meeting], project_id: EntityId) -> Option<&Meeting> {
    meetings
        .iter()
        .filter(|m| m.project_id == project_id)
        .fold(None, |latest: Option<&Meeting>, m| match latest {
            Some(l) if l.scheduled_at >= m.scheduled_at => Some(l),
            _ => Some(m),
        })
}

/// Build a new meeting draft for `project_id`, pre-seeded with the
/// incomplete tasks of that project's most recent meeting.
///
/// Cloned tasks get fresh ids and their completion flag reset. Older
/// meetings are never consulted, even if the latest one has nothing left
/// open.
pub fn carry_over_draft(
    meetings: &[Meeting],
    project_id: EntityId,
    scheduled_at: Timestamp,
) -> NewMeeting {
    let tasks = latest_meeting(meetings, project_id)
        .map(|m| m.incomplete_tasks().map(|t| TodoTask::new(t.title.clone())).collect())
        .unwrap_or_default();

    NewMeeting {
        project_id,
        scheduled_at,
        notes: String::new(),
        is_completed: false,
        mark: MIN_MARK,
        tasks,
    }
}
