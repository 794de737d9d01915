//! The coordinator that owns [`AppState`] and drives it through backend
//! calls.
//!
//! Every operation follows the same shape: mark the container loading,
//! await the backend with no lock held, then apply the outcome in one short
//! write section. Errors are stored on the container as strings and also
//! returned to the caller. Payloads are validated before any state changes,
//! so validation failures are returned but never stored.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use collab_client::{Backend, ClientResult};
use collab_core::application::{Application, ApplicationBrief, ApplicationStatus, NewMessage};
use collab_core::case::{Case, CaseBrief, CasePatch, NewCase, Reaction, Voter};
use collab_core::error::CoreError;
use collab_core::meeting::{self, Meeting, MeetingPatch, NewMeeting};
use collab_core::milestone::{Milestone, MilestonePatch, MilestoneStatus, NewMilestone};
use collab_core::project::{NewProject, Project, ProjectBrief, ProjectPatch};
use collab_core::types::{BriefOf, EntityId, Record, Timestamp};
use collab_core::user::UserProfile;

use crate::container::EntityContainer;
use crate::reducers;
use crate::selectors::aggregate::{dashboard_summary, DashboardSummary};
use crate::state::AppState;

type Slot<B, F> = fn(&mut AppState) -> &mut EntityContainer<B, F>;

fn projects(s: &mut AppState) -> &mut EntityContainer<ProjectBrief, Project> {
    &mut s.projects
}

fn meetings(s: &mut AppState) -> &mut EntityContainer<Meeting> {
    &mut s.meetings
}

fn cases(s: &mut AppState) -> &mut EntityContainer<CaseBrief, Case> {
    &mut s.cases
}

fn applications(s: &mut AppState) -> &mut EntityContainer<ApplicationBrief, Application> {
    &mut s.applications
}

fn milestones(s: &mut AppState) -> &mut EntityContainer<Milestone> {
    &mut s.milestones
}

fn tutors(s: &mut AppState) -> &mut EntityContainer<UserProfile> {
    &mut s.tutors
}

/// Per-container outcome of [`Store::load_dashboard`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<(&'static str, String)>,
}

impl LoadReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// All failures joined into a single line for display.
    pub fn banner(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|(entity, error)| format!("{entity}: {error}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

pub struct Store {
    backend: Arc<dyn Backend>,
    state: RwLock<AppState>,
    voter: Voter,
}

impl Store {
    /// Create a store with empty containers. Votes are cast as `voter`.
    pub fn new(backend: Arc<dyn Backend>, voter: Voter) -> Self {
        Self {
            backend,
            state: RwLock::new(AppState::default()),
            voter,
        }
    }

    pub fn voter(&self) -> &Voter {
        &self.voter
    }

    /// A copy of the whole state.
    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Run `f` against the state under a read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.read().await;
        f(&state)
    }

    pub async fn summary(&self, now: Timestamp) -> DashboardSummary {
        self.read(|state| dashboard_summary(state, now)).await
    }

    async fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.state.write().await;
        f(&mut state)
    }

    // -----------------------------------------------------------------------
    // Generic transitions
    // -----------------------------------------------------------------------

    async fn load_list<B, F>(
        &self,
        entity: &'static str,
        slot: Slot<B, F>,
        fetch: impl Future<Output = ClientResult<Vec<B>>>,
    ) -> ClientResult<usize> {
        self.update(|s| slot(s).begin_load()).await;
        let result = fetch.await;

        let mut state = self.state.write().await;
        let container = slot(&mut state);
        match result {
            Ok(items) => {
                let count = items.len();
                container.load_succeeded(items);
                tracing::debug!(entity, count, "Loaded list");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(entity, error = %e, "List load failed");
                container.load_failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn load_one<B, F>(
        &self,
        entity: &'static str,
        slot: Slot<B, F>,
        id: EntityId,
        fetch: impl Future<Output = ClientResult<F>>,
    ) -> ClientResult<()>
    where
        B: Record + BriefOf<F>,
        F: Record,
    {
        self.update(|s| slot(s).begin_select(id)).await;
        let result = fetch.await;

        let mut state = self.state.write().await;
        let container = slot(&mut state);
        match result {
            Ok(record) => {
                container.select_succeeded(record);
                tracing::debug!(entity, id, "Selected record");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(entity, id, error = %e, "Record load failed");
                if e.is_not_found() {
                    container.select_missing(e.to_string());
                } else {
                    container.select_failed(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Await a mutation that returns the full record and fold it into the
    /// container with `apply`.
    async fn mutate<B, F, R>(
        &self,
        entity: &'static str,
        slot: Slot<B, F>,
        request: impl Future<Output = ClientResult<F>>,
        apply: impl FnOnce(&mut EntityContainer<B, F>, F) -> R,
    ) -> ClientResult<R> {
        self.update(|s| slot(s).begin_mutation()).await;
        let result = request.await;

        let mut state = self.state.write().await;
        let container = slot(&mut state);
        match result {
            Ok(record) => Ok(apply(container, record)),
            Err(e) => {
                tracing::warn!(entity, error = %e, "Mutation failed");
                container.mutation_failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn create_record<B, F>(
        &self,
        entity: &'static str,
        slot: Slot<B, F>,
        request: impl Future<Output = ClientResult<F>>,
    ) -> ClientResult<EntityId>
    where
        B: Record + BriefOf<F>,
        F: Record,
    {
        self.mutate(entity, slot, request, |container, record| {
            let id = record.id();
            container.created(record);
            tracing::info!(entity, id, "Created record");
            id
        })
        .await
    }

    /// Returns whether the updated record was held locally.
    async fn update_record<B, F>(
        &self,
        entity: &'static str,
        slot: Slot<B, F>,
        request: impl Future<Output = ClientResult<F>>,
    ) -> ClientResult<bool>
    where
        B: Record + BriefOf<F>,
        F: Record,
    {
        self.mutate(entity, slot, request, |container, record| {
            let id = record.id();
            let matched = container.updated(record);
            if matched {
                tracing::debug!(entity, id, "Updated record");
            } else {
                tracing::debug!(entity, id, "Updated record is not held locally");
            }
            matched
        })
        .await
    }

    async fn delete_record<B, F>(
        &self,
        entity: &'static str,
        slot: Slot<B, F>,
        id: EntityId,
        request: impl Future<Output = ClientResult<()>>,
    ) -> ClientResult<()>
    where
        B: Record + BriefOf<F>,
        F: Record,
    {
        self.update(|s| slot(s).begin_mutation()).await;
        let result = request.await;

        let mut state = self.state.write().await;
        let container = slot(&mut state);
        match result {
            Ok(()) => {
                container.removed(id);
                tracing::info!(entity, id, "Deleted record");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(entity, id, error = %e, "Delete failed");
                container.mutation_failed(e.to_string());
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Batch
    // -----------------------------------------------------------------------

    /// Load every list concurrently. Each container settles on its own; a
    /// failure in one leaves the others untouched.
    pub async fn load_dashboard(&self) -> LoadReport {
        let (projects, meetings, cases, applications, milestones, tutors) = tokio::join!(
            self.load_projects(),
            self.load_meetings(None),
            self.load_cases(),
            self.load_applications(),
            self.load_milestones(),
            self.load_tutors(),
        );

        let mut report = LoadReport::default();
        for (entity, result) in [
            ("projects", projects),
            ("meetings", meetings),
            ("cases", cases),
            ("applications", applications),
            ("milestones", milestones),
            ("tutors", tutors),
        ] {
            if let Err(e) = result {
                report.errors.push((entity, e.to_string()));
            }
        }
        tracing::info!(failed = report.errors.len(), "Dashboard load finished");
        report
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub async fn load_projects(&self) -> ClientResult<usize> {
        self.load_list("projects", projects, self.backend.list_projects())
            .await
    }

    pub async fn select_project(&self, id: EntityId) -> ClientResult<()> {
        self.load_one("projects", projects, id, self.backend.get_project(id))
            .await
    }

    pub async fn create_project(&self, input: &NewProject) -> ClientResult<EntityId> {
        input.validate()?;
        self.create_record("projects", projects, self.backend.create_project(input))
            .await
    }

    pub async fn update_project(&self, id: EntityId, patch: &ProjectPatch) -> ClientResult<bool> {
        patch.validate()?;
        self.update_record("projects", projects, self.backend.update_project(id, patch))
            .await
    }

    pub async fn assign_tutor(
        &self,
        id: EntityId,
        tutor_id: Option<EntityId>,
    ) -> ClientResult<bool> {
        self.update_record("projects", projects, self.backend.assign_tutor(id, tutor_id))
            .await
    }

    // -----------------------------------------------------------------------
    // Meetings
    // -----------------------------------------------------------------------

    /// Load meetings, optionally limited to one project. The list is
    /// replaced either way.
    pub async fn load_meetings(&self, project_id: Option<EntityId>) -> ClientResult<usize> {
        self.load_list("meetings", meetings, self.backend.list_meetings(project_id))
            .await
    }

    pub async fn select_meeting(&self, id: EntityId) -> ClientResult<()> {
        self.load_one("meetings", meetings, id, self.backend.get_meeting(id))
            .await
    }

    pub async fn create_meeting(&self, input: &NewMeeting) -> ClientResult<EntityId> {
        input.validate()?;
        self.create_record("meetings", meetings, self.backend.create_meeting(input))
            .await
    }

    pub async fn update_meeting(&self, id: EntityId, patch: &MeetingPatch) -> ClientResult<bool> {
        patch.validate()?;
        self.update_record("meetings", meetings, self.backend.update_meeting(id, patch))
            .await
    }

    pub async fn delete_meeting(&self, id: EntityId) -> ClientResult<()> {
        self.delete_record("meetings", meetings, id, self.backend.delete_meeting(id))
            .await
    }

    /// Draft the next meeting of `project_id` from the loaded meetings,
    /// carrying over the open tasks of the latest one.
    pub async fn draft_carry_over(
        &self,
        project_id: EntityId,
        scheduled_at: Timestamp,
    ) -> NewMeeting {
        self.read(|s| meeting::carry_over_draft(s.meetings.items(), project_id, scheduled_at))
            .await
    }

    /// Flip a task's completion flag and persist the meeting's task list.
    ///
    /// Returns `false` when the meeting has no task with `task_id`.
    pub async fn toggle_task(&self, meeting_id: EntityId, task_id: Uuid) -> ClientResult<bool> {
        let held = self
            .read(|s| {
                s.meetings
                    .current()
                    .filter(|m| m.id == meeting_id)
                    .or_else(|| s.meetings.find(meeting_id))
                    .cloned()
            })
            .await;
        let mut meeting = held.ok_or(CoreError::NotFound {
            entity: "Meeting",
            id: meeting_id,
        })?;
        if !meeting.toggle_task(task_id) {
            return Ok(false);
        }

        let patch = MeetingPatch {
            tasks: Some(meeting.tasks),
            ..Default::default()
        };
        self.update_meeting(meeting_id, &patch).await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Cases
    // -----------------------------------------------------------------------

    pub async fn load_cases(&self) -> ClientResult<usize> {
        self.load_list("cases", cases, self.backend.list_cases()).await
    }

    pub async fn select_case(&self, id: EntityId) -> ClientResult<()> {
        self.load_one("cases", cases, id, self.backend.get_case(id))
            .await
    }

    pub async fn create_case(&self, input: &NewCase) -> ClientResult<EntityId> {
        input.validate()?;
        self.create_record("cases", cases, self.backend.create_case(input))
            .await
    }

    pub async fn update_case(&self, id: EntityId, patch: &CasePatch) -> ClientResult<bool> {
        patch.validate()?;
        self.update_record("cases", cases, self.backend.update_case(id, patch))
            .await
    }

    pub async fn set_case_active(&self, id: EntityId, is_active: bool) -> ClientResult<bool> {
        self.update_record("cases", cases, self.backend.set_case_active(id, is_active))
            .await
    }

    /// Cast (or with `None`, withdraw) this store's vote on a case.
    ///
    /// The vote is applied to the list and current slot before the backend
    /// answers. A rejected vote restores the previous vote sets.
    pub async fn vote(&self, case_id: EntityId, reaction: Option<Reaction>) -> ClientResult<()> {
        let snapshot = self
            .update(|s| {
                s.cases.begin_mutation();
                reducers::cast_vote(&mut s.cases, case_id, &self.voter, reaction)
            })
            .await;

        let result = match reaction {
            Some(reaction) => self.backend.vote_case(case_id, &self.voter, reaction).await,
            None => self.backend.unvote_case(case_id, &self.voter).await,
        };

        let mut state = self.state.write().await;
        match result {
            Ok(()) => {
                state.cases.mutation_succeeded();
                tracing::debug!(case_id, user_id = self.voter.user_id, ?reaction, "Vote recorded");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(case_id, error = %e, "Vote rejected, rolling back");
                reducers::restore_votes(&mut state.cases, snapshot);
                state.cases.mutation_failed(e.to_string());
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Applications
    // -----------------------------------------------------------------------

    pub async fn load_applications(&self) -> ClientResult<usize> {
        self.load_list("applications", applications, self.backend.list_applications())
            .await
    }

    pub async fn select_application(&self, id: EntityId) -> ClientResult<()> {
        self.load_one("applications", applications, id, self.backend.get_application(id))
            .await
    }

    pub async fn set_application_status(
        &self,
        id: EntityId,
        status: ApplicationStatus,
    ) -> ClientResult<bool> {
        self.update_record(
            "applications",
            applications,
            self.backend.set_application_status(id, status),
        )
        .await
    }

    pub async fn send_message(&self, id: EntityId, input: &NewMessage) -> ClientResult<bool> {
        input.validate()?;
        self.update_record("applications", applications, self.backend.send_message(id, input))
            .await
    }

    pub async fn mark_messages_read(&self, id: EntityId) -> ClientResult<bool> {
        self.update_record("applications", applications, self.backend.mark_messages_read(id))
            .await
    }

    // -----------------------------------------------------------------------
    // Milestones
    // -----------------------------------------------------------------------

    pub async fn load_milestones(&self) -> ClientResult<usize> {
        self.load_list("milestones", milestones, self.backend.list_milestones())
            .await
    }

    pub async fn select_milestone(&self, id: EntityId) -> ClientResult<()> {
        self.load_one("milestones", milestones, id, self.backend.get_milestone(id))
            .await
    }

    pub async fn create_milestone(&self, input: &NewMilestone) -> ClientResult<EntityId> {
        input.validate()?;
        self.create_record("milestones", milestones, self.backend.create_milestone(input))
            .await
    }

    pub async fn update_milestone(
        &self,
        id: EntityId,
        patch: &MilestonePatch,
    ) -> ClientResult<bool> {
        self.update_record("milestones", milestones, self.backend.update_milestone(id, patch))
            .await
    }

    pub async fn delete_milestone(&self, id: EntityId) -> ClientResult<()> {
        self.delete_record("milestones", milestones, id, self.backend.delete_milestone(id))
            .await
    }

    /// Set progress locally, then persist it. The value is not range
    /// checked. A rejected update restores the previous record.
    pub async fn set_milestone_progress(&self, id: EntityId, progress: i32) -> ClientResult<()> {
        let patch = MilestonePatch {
            progress: Some(progress),
            ..Default::default()
        };
        self.edit_milestone(id, &patch, |c, now| {
            reducers::set_milestone_progress(c, id, progress, now)
        })
        .await
    }

    /// Set the status locally, then persist it. `Overdue` before the target
    /// date is a validation error and leaves the state untouched.
    pub async fn set_milestone_status(
        &self,
        id: EntityId,
        status: MilestoneStatus,
    ) -> ClientResult<()> {
        let patch = MilestonePatch {
            status: Some(status),
            ..Default::default()
        };
        self.edit_milestone(id, &patch, |c, now| {
            reducers::set_milestone_status(c, id, status, now)
        })
        .await
    }

    async fn edit_milestone(
        &self,
        id: EntityId,
        patch: &MilestonePatch,
        local: impl FnOnce(
            &mut EntityContainer<Milestone>,
            Timestamp,
        ) -> Result<Option<reducers::MilestoneSnapshot>, CoreError>,
    ) -> ClientResult<()> {
        let snapshot = self
            .update(|s| {
                let snapshot = local(&mut s.milestones, Utc::now())?;
                s.milestones.begin_mutation();
                Ok::<_, CoreError>(snapshot)
            })
            .await?;

        let result = self.backend.update_milestone(id, patch).await;

        let mut state = self.state.write().await;
        match result {
            Ok(record) => {
                state.milestones.updated(record);
                tracing::debug!(id, "Milestone persisted");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Milestone update rejected, rolling back");
                if let Some(snapshot) = snapshot {
                    reducers::restore_milestone(&mut state.milestones, snapshot);
                }
                state.milestones.mutation_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Mark past-due milestones overdue as of `now`. Local only; nothing is
    /// sent to the backend and nothing schedules this.
    pub async fn sweep_overdue(&self, now: Timestamp) -> usize {
        let changed = self
            .update(|s| reducers::sweep_overdue_milestones(&mut s.milestones, now))
            .await;
        tracing::info!(changed, "Overdue sweep finished");
        changed
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub async fn load_tutors(&self) -> ClientResult<usize> {
        self.load_list("tutors", tutors, self.backend.list_tutors()).await
    }
}
