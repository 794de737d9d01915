//! In-memory fallback backend.
//!
//! Resolves every [`Backend`] call against a [`MockData`] snapshot instead of
//! performing network I/O. An artificial delay precedes each call so the
//! caller still observes a pending state.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use collab_core::application::{Application, ApplicationBrief, ApplicationStatus, NewMessage};
use collab_core::case::{Case, CaseBrief, CasePatch, NewCase, Reaction, Voter};
use collab_core::error::CoreError;
use collab_core::meeting::{Meeting, MeetingPatch, NewMeeting};
use collab_core::milestone::{Milestone, MilestonePatch, NewMilestone};
use collab_core::project::{NewProject, Project, ProjectBrief, ProjectPatch, ProjectStatus};
use collab_core::types::{BriefOf, EntityId, Record};
use collab_core::user::UserProfile;

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult};
use crate::seed;

/// Default artificial latency per call.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// Records held by the mock backend.
#[derive(Debug, Clone, Default)]
pub struct MockData {
    pub projects: Vec<Project>,
    pub meetings: Vec<Meeting>,
    pub cases: Vec<Case>,
    pub applications: Vec<Application>,
    pub milestones: Vec<Milestone>,
    pub users: Vec<UserProfile>,
    /// Next server-style id to assign.
    pub next_id: EntityId,
}

impl MockData {
    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn tutor_name(&self, tutor_id: Option<EntityId>) -> ClientResult<Option<String>> {
        let Some(id) = tutor_id else {
            return Ok(None);
        };
        let user = find(&self.users, "User", id)?;
        if !user.role.can_supervise() {
            return Err(CoreError::Validation(format!(
                "User {id} cannot be assigned as a tutor"
            ))
            .into());
        }
        Ok(Some(user.full_name.clone()))
    }
}

fn find<'a, T: Record>(items: &'a [T], entity: &'static str, id: EntityId) -> ClientResult<&'a T> {
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| CoreError::NotFound { entity, id }.into())
}

fn find_mut<'a, T: Record>(
    items: &'a mut [T],
    entity: &'static str,
    id: EntityId,
) -> ClientResult<&'a mut T> {
    items
        .iter_mut()
        .find(|item| item.id() == id)
        .ok_or_else(|| CoreError::NotFound { entity, id }.into())
}

fn remove<T: Record>(items: &mut Vec<T>, entity: &'static str, id: EntityId) -> ClientResult<()> {
    let before = items.len();
    items.retain(|item| item.id() != id);
    if items.len() == before {
        return Err(CoreError::NotFound { entity, id }.into());
    }
    Ok(())
}

/// An API failure queued for a named operation.
#[derive(Debug, Clone)]
struct InjectedFailure {
    status: u16,
    message: String,
}

/// Backend that serves a seeded in-memory dataset.
pub struct MockBackend {
    data: Mutex<MockData>,
    failures: Mutex<HashMap<&'static str, VecDeque<InjectedFailure>>>,
    latency: Duration,
}

impl MockBackend {
    /// Serve the deterministic seed dataset with the given per-call latency.
    pub fn seeded(latency: Duration) -> Self {
        Self::with_data(seed::dataset(), latency)
    }

    pub fn with_data(data: MockData, latency: Duration) -> Self {
        Self {
            data: Mutex::new(data),
            failures: Mutex::new(HashMap::new()),
            latency,
        }
    }

    /// Copy of the current dataset, for inspection.
    pub async fn snapshot(&self) -> MockData {
        self.data.lock().await.clone()
    }

    /// Make the next call to `operation` (the [`Backend`] method name) fail
    /// with an API error. Multiple failures queue up in order.
    pub async fn fail_next(
        &self,
        operation: &'static str,
        status: u16,
        message: impl Into<String>,
    ) {
        self.failures
            .lock()
            .await
            .entry(operation)
            .or_default()
            .push_back(InjectedFailure {
                status,
                message: message.into(),
            });
    }

    /// Simulate the round trip: wait out the latency, then surface any
    /// failure queued for `operation`.
    async fn enter(&self, operation: &'static str) -> ClientResult<()> {
        tracing::trace!(
            operation,
            latency_ms = self.latency.as_millis() as u64,
            "Mock backend call"
        );
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let injected = self
            .failures
            .lock()
            .await
            .get_mut(operation)
            .and_then(VecDeque::pop_front);
        match injected {
            Some(failure) => Err(ClientError::Api {
                status: failure.status,
                message: failure.message,
            }),
            None => Ok(()),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::seeded(DEFAULT_LATENCY)
    }
}

#[async_trait]
impl Backend for MockBackend {
    // ---- projects ----

    async fn list_projects(&self) -> ClientResult<Vec<ProjectBrief>> {
        self.enter("list_projects").await?;
        let data = self.data.lock().await;
        Ok(data.projects.iter().map(ProjectBrief::brief_of).collect())
    }

    async fn get_project(&self, id: EntityId) -> ClientResult<Project> {
        self.enter("get_project").await?;
        let data = self.data.lock().await;
        find(&data.projects, "Project", id).cloned()
    }

    async fn create_project(&self, input: &NewProject) -> ClientResult<Project> {
        input.validate()?;
        self.enter("create_project").await?;
        let mut data = self.data.lock().await;
        let tutor_name = data.tutor_name(input.tutor_id)?;
        let project = Project {
            id: data.allocate_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            team_name: input.team_name.clone(),
            meeting_link: input.meeting_link.clone(),
            status: ProjectStatus::Created,
            semester: input.semester,
            year: input.year,
            tutor_id: input.tutor_id,
            tutor_name,
        };
        data.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: EntityId, patch: &ProjectPatch) -> ClientResult<Project> {
        patch.validate()?;
        self.enter("update_project").await?;
        let mut data = self.data.lock().await;
        let project = find_mut(&mut data.projects, "Project", id)?;
        project.apply_patch(patch);
        Ok(project.clone())
    }

    async fn assign_tutor(
        &self,
        id: EntityId,
        tutor_id: Option<EntityId>,
    ) -> ClientResult<Project> {
        self.enter("assign_tutor").await?;
        let mut data = self.data.lock().await;
        let tutor_name = data.tutor_name(tutor_id)?;
        let project = find_mut(&mut data.projects, "Project", id)?;
        project.tutor_id = tutor_id;
        project.tutor_name = tutor_name;
        Ok(project.clone())
    }

    // ---- meetings ----

    async fn list_meetings(&self, project_id: Option<EntityId>) -> ClientResult<Vec<Meeting>> {
        self.enter("list_meetings").await?;
        let data = self.data.lock().await;
        Ok(data
            .meetings
            .iter()
            .filter(|m| project_id.map_or(true, |pid| m.project_id == pid))
            .cloned()
            .collect())
    }

    async fn get_meeting(&self, id: EntityId) -> ClientResult<Meeting> {
        self.enter("get_meeting").await?;
        let data = self.data.lock().await;
        find(&data.meetings, "Meeting", id).cloned()
    }

    async fn create_meeting(&self, input: &NewMeeting) -> ClientResult<Meeting> {
        input.validate()?;
        self.enter("create_meeting").await?;
        let mut data = self.data.lock().await;
        find(&data.projects, "Project", input.project_id)?;
        let meeting = Meeting {
            id: data.allocate_id(),
            project_id: input.project_id,
            scheduled_at: input.scheduled_at,
            notes: input.notes.clone(),
            is_completed: input.is_completed,
            mark: input.mark,
            tasks: input.tasks.clone(),
        };
        data.meetings.push(meeting.clone());
        Ok(meeting)
    }

    async fn update_meeting(&self, id: EntityId, patch: &MeetingPatch) -> ClientResult<Meeting> {
        patch.validate()?;
        self.enter("update_meeting").await?;
        let mut data = self.data.lock().await;
        let meeting = find_mut(&mut data.meetings, "Meeting", id)?;
        meeting.apply_patch(patch);
        Ok(meeting.clone())
    }

    async fn delete_meeting(&self, id: EntityId) -> ClientResult<()> {
        self.enter("delete_meeting").await?;
        let mut data = self.data.lock().await;
        remove(&mut data.meetings, "Meeting", id)
    }

    // ---- cases ----

    async fn list_cases(&self) -> ClientResult<Vec<CaseBrief>> {
        self.enter("list_cases").await?;
        let data = self.data.lock().await;
        Ok(data.cases.iter().map(CaseBrief::brief_of).collect())
    }

    async fn get_case(&self, id: EntityId) -> ClientResult<Case> {
        self.enter("get_case").await?;
        let data = self.data.lock().await;
        find(&data.cases, "Case", id).cloned()
    }

    async fn create_case(&self, input: &NewCase) -> ClientResult<Case> {
        input.validate()?;
        self.enter("create_case").await?;
        let mut data = self.data.lock().await;
        let tutor_name = data.tutor_name(input.tutor_id)?;
        let case = Case {
            id: data.allocate_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            goal: input.goal.clone(),
            expected_result: input.expected_result.clone(),
            criteria: input.criteria.clone(),
            tutor_id: input.tutor_id,
            tutor_name,
            max_teams: input.max_teams,
            accepted_teams: 0,
            is_active: true,
            votes: Default::default(),
        };
        data.cases.push(case.clone());
        Ok(case)
    }

    async fn update_case(&self, id: EntityId, patch: &CasePatch) -> ClientResult<Case> {
        patch.validate()?;
        self.enter("update_case").await?;
        let mut data = self.data.lock().await;
        let case = find_mut(&mut data.cases, "Case", id)?;
        case.apply_patch(patch);
        Ok(case.clone())
    }

    async fn set_case_active(&self, id: EntityId, is_active: bool) -> ClientResult<Case> {
        self.enter("set_case_active").await?;
        let mut data = self.data.lock().await;
        let case = find_mut(&mut data.cases, "Case", id)?;
        case.is_active = is_active;
        Ok(case.clone())
    }

    async fn vote_case(
        &self,
        case_id: EntityId,
        voter: &Voter,
        reaction: Reaction,
    ) -> ClientResult<()> {
        self.enter("vote_case").await?;
        let mut data = self.data.lock().await;
        let case = find_mut(&mut data.cases, "Case", case_id)?;
        case.votes.cast(voter.clone(), Some(reaction));
        Ok(())
    }

    async fn unvote_case(&self, case_id: EntityId, voter: &Voter) -> ClientResult<()> {
        self.enter("unvote_case").await?;
        let mut data = self.data.lock().await;
        let case = find_mut(&mut data.cases, "Case", case_id)?;
        case.votes.cast(voter.clone(), None);
        Ok(())
    }

    // ---- applications ----

    async fn list_applications(&self) -> ClientResult<Vec<ApplicationBrief>> {
        self.enter("list_applications").await?;
        let data = self.data.lock().await;
        Ok(data
            .applications
            .iter()
            .map(ApplicationBrief::brief_of)
            .collect())
    }

    async fn get_application(&self, id: EntityId) -> ClientResult<Application> {
        self.enter("get_application").await?;
        let data = self.data.lock().await;
        find(&data.applications, "Application", id).cloned()
    }

    async fn set_application_status(
        &self,
        id: EntityId,
        status: ApplicationStatus,
    ) -> ClientResult<Application> {
        self.enter("set_application_status").await?;
        let mut data = self.data.lock().await;
        let application = find_mut(&mut data.applications, "Application", id)?;
        application.set_status(status, Utc::now());
        Ok(application.clone())
    }

    async fn send_message(&self, id: EntityId, input: &NewMessage) -> ClientResult<Application> {
        input.validate()?;
        self.enter("send_message").await?;
        let mut data = self.data.lock().await;
        let message_id = data.allocate_id();
        let application = find_mut(&mut data.applications, "Application", id)?;
        application.push_reply(message_id, input.content.clone(), Utc::now());
        Ok(application.clone())
    }

    async fn mark_messages_read(&self, id: EntityId) -> ClientResult<Application> {
        self.enter("mark_messages_read").await?;
        let mut data = self.data.lock().await;
        let application = find_mut(&mut data.applications, "Application", id)?;
        application.mark_read();
        Ok(application.clone())
    }

    // ---- milestones ----

    async fn list_milestones(&self) -> ClientResult<Vec<Milestone>> {
        self.enter("list_milestones").await?;
        Ok(self.data.lock().await.milestones.clone())
    }

    async fn get_milestone(&self, id: EntityId) -> ClientResult<Milestone> {
        self.enter("get_milestone").await?;
        let data = self.data.lock().await;
        find(&data.milestones, "Milestone", id).cloned()
    }

    async fn create_milestone(&self, input: &NewMilestone) -> ClientResult<Milestone> {
        input.validate()?;
        self.enter("create_milestone").await?;
        let mut data = self.data.lock().await;
        if let Some(project_id) = input.project_id {
            find(&data.projects, "Project", project_id)?;
        }
        let id = data.allocate_id();
        let milestone = input.clone().into_milestone(id, Utc::now());
        data.milestones.push(milestone.clone());
        Ok(milestone)
    }

    async fn update_milestone(
        &self,
        id: EntityId,
        patch: &MilestonePatch,
    ) -> ClientResult<Milestone> {
        self.enter("update_milestone").await?;
        let mut data = self.data.lock().await;
        let milestone = find_mut(&mut data.milestones, "Milestone", id)?;
        milestone.apply_patch(patch, Utc::now())?;
        Ok(milestone.clone())
    }

    async fn delete_milestone(&self, id: EntityId) -> ClientResult<()> {
        self.enter("delete_milestone").await?;
        let mut data = self.data.lock().await;
        remove(&mut data.milestones, "Milestone", id)
    }

    // ---- users ----

    async fn list_tutors(&self) -> ClientResult<Vec<UserProfile>> {
        self.enter("list_tutors").await?;
        let data = self.data.lock().await;
        Ok(data
            .users
            .iter()
            .filter(|u| u.role.can_supervise())
            .cloned()
            .collect())
    }
}
