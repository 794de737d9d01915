//! Student team applications to cases and their reviewer message threads.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{BriefOf, EntityId, Record, Timestamp};

/// Maximum length of a single thread message.
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Application review status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    InProgress,
    New,
    MeetPlanned,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::InProgress,
        ApplicationStatus::New,
        ApplicationStatus::MeetPlanned,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];
}

/// Which side of the conversation wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    FromTeam,
    FromReviewer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: EntityId,
    pub content: String,
    pub sent_at: Timestamp,
    pub is_read: bool,
    pub direction: MessageDirection,
}

/// Full application record including the message thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: EntityId,
    pub case_id: EntityId,
    pub case_title: String,
    pub team_title: String,
    pub telegram: Option<String>,
    pub status: ApplicationStatus,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Abbreviated application projection used in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationBrief {
    pub id: EntityId,
    pub case_id: EntityId,
    pub case_title: String,
    pub team_title: String,
    pub telegram: Option<String>,
    pub status: ApplicationStatus,
    pub updated_at: Timestamp,
    /// Team messages not yet read by a reviewer.
    #[serde(default)]
    pub unread_count: usize,
}

impl Application {
    /// Number of team messages the reviewer has not read.
    pub fn unread_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.direction == MessageDirection::FromTeam && !m.is_read)
            .count()
    }

    pub fn set_status(&mut self, status: ApplicationStatus, now: Timestamp) {
        self.status = status;
        self.updated_at = now;
    }

    /// Mark every team message as read. Returns how many changed.
    pub fn mark_read(&mut self) -> usize {
        let mut changed = 0;
        for m in self
            .messages
            .iter_mut()
            .filter(|m| m.direction == MessageDirection::FromTeam && !m.is_read)
        {
            m.is_read = true;
            changed += 1;
        }
        changed
    }

    /// Append a reviewer reply to the thread.
    pub fn push_reply(&mut self, id: EntityId, content: String, now: Timestamp) {
        self.messages.push(Message {
            id,
            content,
            sent_at: now,
            is_read: true,
            direction: MessageDirection::FromReviewer,
        });
        self.updated_at = now;
    }
}

impl Record for Application {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Record for ApplicationBrief {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl BriefOf<Application> for ApplicationBrief {
    fn brief_of(full: &Application) -> Self {
        ApplicationBrief {
            id: full.id,
            case_id: full.case_id,
            case_title: full.case_title.clone(),
            team_title: full.team_title.clone(),
            telegram: full.telegram.clone(),
            status: full.status,
            updated_at: full.updated_at,
            unread_count: full.unread_count(),
        }
    }
}

/// Body of the status transition endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ApplicationStatus,
}

/// Body of the message send endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub content: String,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.content.trim().is_empty() {
            return Err(CoreError::Validation(
                "Message must not be empty".to_string(),
            ));
        }
        if self.content.len() > MAX_MESSAGE_LEN {
            return Err(CoreError::Validation(format!(
                "Message too long: {} chars (max {MAX_MESSAGE_LEN})",
                self.content.len()
            )));
        }
        Ok(())
    }
}
