//! Collaboration projects, their semester labels and create/update payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{BriefOf, EntityId, Record};

/// Maximum length of a project title.
pub const MAX_TITLE_LEN: usize = 200;

/// Semester code stored on the backend for the autumn term.
pub const SEMESTER_CODE_AUTUMN: i16 = 1;

/// Semester code stored on the backend for the spring term.
pub const SEMESTER_CODE_SPRING: i16 = 2;

// ---------------------------------------------------------------------------
// Status and semester
// ---------------------------------------------------------------------------

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Created,
    InWork,
    Completed,
}

/// Display label derived from an integer semester code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Semester {
    Autumn,
    Spring,
}

impl Semester {
    /// Map a stored semester code to its label. Unknown codes have no label.
    pub fn from_code(code: i16) -> Option<Semester> {
        match code {
            SEMESTER_CODE_AUTUMN => Some(Semester::Autumn),
            SEMESTER_CODE_SPRING => Some(Semester::Spring),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Semester::Autumn => "Autumn",
            Semester::Spring => "Spring",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Semester {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "autumn" => Ok(Semester::Autumn),
            "spring" => Ok(Semester::Spring),
            other => Err(CoreError::Validation(format!(
                "Invalid semester '{other}'. Must be one of: Autumn, Spring"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Full project record returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub team_name: String,
    pub meeting_link: Option<String>,
    pub status: ProjectStatus,
    /// Integer semester code; see [`Semester::from_code`].
    pub semester: i16,
    pub year: i32,
    pub tutor_id: Option<EntityId>,
    pub tutor_name: Option<String>,
}

/// Abbreviated project projection used in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBrief {
    pub id: EntityId,
    pub title: String,
    pub team_name: String,
    pub status: ProjectStatus,
    pub semester: i16,
    pub year: i32,
    pub tutor_name: Option<String>,
}

impl Project {
    pub fn semester_label(&self) -> Option<Semester> {
        Semester::from_code(self.semester)
    }

    /// Apply a partial update. Fields absent from the patch are untouched.
    pub fn apply_patch(&mut self, patch: &ProjectPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(team_name) = &patch.team_name {
            self.team_name = team_name.clone();
        }
        if let Some(link) = &patch.meeting_link {
            self.meeting_link = Some(link.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(semester) = patch.semester {
            self.semester = semester;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
    }
}

impl ProjectBrief {
    pub fn semester_label(&self) -> Option<Semester> {
        Semester::from_code(self.semester)
    }
}

impl Record for Project {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Record for ProjectBrief {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl BriefOf<Project> for ProjectBrief {
    fn brief_of(full: &Project) -> Self {
        ProjectBrief {
            id: full.id,
            title: full.title.clone(),
            team_name: full.team_name.clone(),
            status: full.status,
            semester: full.semester,
            year: full.year,
            tutor_name: full.tutor_name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Payload for creating a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub team_name: String,
    pub meeting_link: Option<String>,
    pub semester: i16,
    pub year: i32,
    pub tutor_id: Option<EntityId>,
}

/// Partial update for a project. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// Body of the tutor assignment endpoint. `None` removes the tutor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TutorAssignment {
    pub tutor_id: Option<EntityId>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a project title: non-empty after trimming and within length limit.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Project title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Project title too long: {} chars (max {MAX_TITLE_LEN})",
            title.len()
        )));
    }
    Ok(())
}

/// Validate that a semester code maps to a known label.
pub fn validate_semester_code(code: i16) -> Result<(), CoreError> {
    Semester::from_code(code).map(|_| ()).ok_or_else(|| {
        CoreError::Validation(format!(
            "Invalid semester code {code}. Must be {SEMESTER_CODE_AUTUMN} (Autumn) or {SEMESTER_CODE_SPRING} (Spring)"
        ))
    })
}

impl NewProject {
    /// Required-field check run before the payload is submitted.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title)?;
        if self.team_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "Team name must not be empty".to_string(),
            ));
        }
        validate_semester_code(self.semester)?;
        Ok(())
    }
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(code) = self.semester {
            validate_semester_code(code)?;
        }
        Ok(())
    }
}
