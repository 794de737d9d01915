//! The request surface shared by the HTTP and in-memory backends.

use async_trait::async_trait;

use collab_core::application::{Application, ApplicationBrief, ApplicationStatus, NewMessage};
use collab_core::case::{Case, CaseBrief, CasePatch, NewCase, Reaction, Voter};
use collab_core::meeting::{Meeting, MeetingPatch, NewMeeting};
use collab_core::milestone::{Milestone, MilestonePatch, NewMilestone};
use collab_core::project::{NewProject, Project, ProjectBrief, ProjectPatch};
use collab_core::types::EntityId;
use collab_core::user::UserProfile;

use crate::error::ClientResult;

/// One request function per (entity, operation) pair.
///
/// Create payloads are validated before anything is sent; a validation
/// failure is returned as [`CoreError::Validation`](collab_core::error::CoreError::Validation).
/// No implementation caches or retries.
#[async_trait]
pub trait Backend: Send + Sync {
    // ---- projects ----

    async fn list_projects(&self) -> ClientResult<Vec<ProjectBrief>>;
    async fn get_project(&self, id: EntityId) -> ClientResult<Project>;
    async fn create_project(&self, input: &NewProject) -> ClientResult<Project>;
    async fn update_project(&self, id: EntityId, patch: &ProjectPatch) -> ClientResult<Project>;
    /// Assign a tutor to a project, or remove the assignment with `None`.
    async fn assign_tutor(&self, id: EntityId, tutor_id: Option<EntityId>)
        -> ClientResult<Project>;

    // ---- meetings ----

    async fn list_meetings(&self, project_id: Option<EntityId>) -> ClientResult<Vec<Meeting>>;
    async fn get_meeting(&self, id: EntityId) -> ClientResult<Meeting>;
    async fn create_meeting(&self, input: &NewMeeting) -> ClientResult<Meeting>;
    async fn update_meeting(&self, id: EntityId, patch: &MeetingPatch) -> ClientResult<Meeting>;
    async fn delete_meeting(&self, id: EntityId) -> ClientResult<()>;

    // ---- cases ----

    async fn list_cases(&self) -> ClientResult<Vec<CaseBrief>>;
    async fn get_case(&self, id: EntityId) -> ClientResult<Case>;
    async fn create_case(&self, input: &NewCase) -> ClientResult<Case>;
    async fn update_case(&self, id: EntityId, patch: &CasePatch) -> ClientResult<Case>;
    async fn set_case_active(&self, id: EntityId, is_active: bool) -> ClientResult<Case>;
    /// Record `voter`'s reaction. Acknowledged without a body.
    async fn vote_case(&self, case_id: EntityId, voter: &Voter, reaction: Reaction)
        -> ClientResult<()>;
    /// Withdraw `voter`'s reaction. Acknowledged without a body.
    async fn unvote_case(&self, case_id: EntityId, voter: &Voter) -> ClientResult<()>;

    // ---- applications ----

    async fn list_applications(&self) -> ClientResult<Vec<ApplicationBrief>>;
    async fn get_application(&self, id: EntityId) -> ClientResult<Application>;
    async fn set_application_status(
        &self,
        id: EntityId,
        status: ApplicationStatus,
    ) -> ClientResult<Application>;
    /// Post a reviewer message; returns the application with its updated thread.
    async fn send_message(&self, id: EntityId, input: &NewMessage) -> ClientResult<Application>;
    async fn mark_messages_read(&self, id: EntityId) -> ClientResult<Application>;

    // ---- milestones ----

    async fn list_milestones(&self) -> ClientResult<Vec<Milestone>>;
    async fn get_milestone(&self, id: EntityId) -> ClientResult<Milestone>;
    async fn create_milestone(&self, input: &NewMilestone) -> ClientResult<Milestone>;
    async fn update_milestone(
        &self,
        id: EntityId,
        patch: &MilestonePatch,
    ) -> ClientResult<Milestone>;
    async fn delete_milestone(&self, id: EntityId) -> ClientResult<()>;

    // ---- users ----

    /// Users who can be assigned as tutors or curators.
    async fn list_tutors(&self) -> ClientResult<Vec<UserProfile>>;
}
