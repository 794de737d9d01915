//! REST backend client.
//!
//! Wraps the collaboration API using [`reqwest`]. Successful responses are
//! expected in the `{ "data": T }` envelope and failures as
//! `{ "error": message, "code": CODE }`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use collab_core::application::{
    Application, ApplicationBrief, ApplicationStatus, NewMessage, StatusChange,
};
use collab_core::case::{
    ActiveFlag, Case, CaseBrief, CasePatch, NewCase, Reaction, VoteRequest, Voter,
};
use collab_core::error::CoreError;
use collab_core::meeting::{Meeting, MeetingPatch, NewMeeting};
use collab_core::milestone::{Milestone, MilestonePatch, NewMilestone};
use collab_core::project::{NewProject, Project, ProjectBrief, ProjectPatch, TutorAssignment};
use collab_core::types::EntityId;
use collab_core::user::UserProfile;

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

/// Error body returned by the API for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for a single collaboration API instance.
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpBackend {
    /// Create a client for the API at `api_url`, e.g. `http://host:3000/api`.
    ///
    /// `timeout` bounds every request end to end.
    pub fn new(api_url: String, token: Option<String>, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url, token))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(method = %method, path = %path, "Backend request");
        let builder = self.client.request(method, format!("{}{}", self.api_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the enveloped JSON body.
    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Send a request and discard the body.
    async fn execute(request: RequestBuilder) -> ClientResult<()> {
        let response = request.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ClientError::Api`] carrying
    /// the status and server message on failure.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        tracing::warn!(status = status.as_u16(), message = %message, "Backend rejected request");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<DataResponse<T>>().await?.data)
    }
}

/// Map a 404 on a by-id request to [`CoreError::NotFound`].
fn not_found_as(entity: &'static str, id: EntityId) -> impl FnOnce(ClientError) -> ClientError {
    move |err| match err {
        ClientError::Api { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            CoreError::NotFound { entity, id }.into()
        }
        other => other,
    }
}

#[async_trait]
impl Backend for HttpBackend {
    // ---- projects ----

    async fn list_projects(&self) -> ClientResult<Vec<ProjectBrief>> {
        Self::fetch(self.request(Method::GET, "/projects")).await
    }

    async fn get_project(&self, id: EntityId) -> ClientResult<Project> {
        Self::fetch(self.request(Method::GET, &format!("/projects/{id}")))
            .await
            .map_err(not_found_as("Project", id))
    }

    async fn create_project(&self, input: &NewProject) -> ClientResult<Project> {
        input.validate()?;
        Self::fetch(self.request(Method::POST, "/projects").json(input)).await
    }

    async fn update_project(&self, id: EntityId, patch: &ProjectPatch) -> ClientResult<Project> {
        patch.validate()?;
        Self::fetch(self.request(Method::PATCH, &format!("/projects/{id}")).json(patch))
            .await
            .map_err(not_found_as("Project", id))
    }

    async fn assign_tutor(
        &self,
        id: EntityId,
        tutor_id: Option<EntityId>,
    ) -> ClientResult<Project> {
        let body = TutorAssignment { tutor_id };
        Self::fetch(self.request(Method::PUT, &format!("/projects/{id}/tutor")).json(&body))
            .await
            .map_err(not_found_as("Project", id))
    }

    // ---- meetings ----

    async fn list_meetings(&self, project_id: Option<EntityId>) -> ClientResult<Vec<Meeting>> {
        let mut request = self.request(Method::GET, "/meetings");
        if let Some(project_id) = project_id {
            request = request.query(&[("project_id", project_id)]);
        }
        Self::fetch(request).await
    }

    async fn get_meeting(&self, id: EntityId) -> ClientResult<Meeting> {
        Self::fetch(self.request(Method::GET, &format!("/meetings/{id}")))
            .await
            .map_err(not_found_as("Meeting", id))
    }

    async fn create_meeting(&self, input: &NewMeeting) -> ClientResult<Meeting> {
        input.validate()?;
        Self::fetch(self.request(Method::POST, "/meetings").json(input)).await
    }

    async fn update_meeting(&self, id: EntityId, patch: &MeetingPatch) -> ClientResult<Meeting> {
        patch.validate()?;
        Self::fetch(self.request(Method::PATCH, &format!("/meetings/{id}")).json(patch))
            .await
            .map_err(not_found_as("Meeting", id))
    }

    async fn delete_meeting(&self, id: EntityId) -> ClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/meetings/{id}")))
            .await
            .map_err(not_found_as("Meeting", id))
    }

    // ---- cases ----

    async fn list_cases(&self) -> ClientResult<Vec<CaseBrief>> {
        Self::fetch(self.request(Method::GET, "/cases")).await
    }

    async fn get_case(&self, id: EntityId) -> ClientResult<Case> {
        Self::fetch(self.request(Method::GET, &format!("/cases/{id}")))
            .await
            .map_err(not_found_as("Case", id))
    }

    async fn create_case(&self, input: &NewCase) -> ClientResult<Case> {
        input.validate()?;
        Self::fetch(self.request(Method::POST, "/cases").json(input)).await
    }

    async fn update_case(&self, id: EntityId, patch: &CasePatch) -> ClientResult<Case> {
        patch.validate()?;
        Self::fetch(self.request(Method::PATCH, &format!("/cases/{id}")).json(patch))
            .await
            .map_err(not_found_as("Case", id))
    }

    async fn set_case_active(&self, id: EntityId, is_active: bool) -> ClientResult<Case> {
        let body = ActiveFlag { is_active };
        Self::fetch(self.request(Method::PUT, &format!("/cases/{id}/active")).json(&body))
            .await
            .map_err(not_found_as("Case", id))
    }

    async fn vote_case(
        &self,
        case_id: EntityId,
        voter: &Voter,
        reaction: Reaction,
    ) -> ClientResult<()> {
        let body = VoteRequest {
            user_id: voter.user_id,
            name: voter.name.clone(),
            reaction,
        };
        Self::execute(
            self.request(Method::POST, &format!("/cases/{case_id}/votes"))
                .json(&body),
        )
        .await
        .map_err(not_found_as("Case", case_id))
    }

    async fn unvote_case(&self, case_id: EntityId, voter: &Voter) -> ClientResult<()> {
        Self::execute(
            self.request(Method::DELETE, &format!("/cases/{case_id}/votes"))
                .query(&[("user_id", voter.user_id)]),
        )
        .await
        .map_err(not_found_as("Case", case_id))
    }

    // ---- applications ----

    async fn list_applications(&self) -> ClientResult<Vec<ApplicationBrief>> {
        Self::fetch(self.request(Method::GET, "/applications")).await
    }

    async fn get_application(&self, id: EntityId) -> ClientResult<Application> {
        Self::fetch(self.request(Method::GET, &format!("/applications/{id}")))
            .await
            .map_err(not_found_as("Application", id))
    }

    async fn set_application_status(
        &self,
        id: EntityId,
        status: ApplicationStatus,
    ) -> ClientResult<Application> {
        let body = StatusChange { status };
        Self::fetch(
            self.request(Method::PUT, &format!("/applications/{id}/status"))
                .json(&body),
        )
        .await
        .map_err(not_found_as("Application", id))
    }

    async fn send_message(&self, id: EntityId, input: &NewMessage) -> ClientResult<Application> {
        input.validate()?;
        Self::fetch(
            self.request(Method::POST, &format!("/applications/{id}/messages"))
                .json(input),
        )
        .await
        .map_err(not_found_as("Application", id))
    }

    async fn mark_messages_read(&self, id: EntityId) -> ClientResult<Application> {
        Self::fetch(self.request(Method::POST, &format!("/applications/{id}/read")))
            .await
            .map_err(not_found_as("Application", id))
    }

    // ---- milestones ----

    async fn list_milestones(&self) -> ClientResult<Vec<Milestone>> {
        Self::fetch(self.request(Method::GET, "/milestones")).await
    }

    async fn get_milestone(&self, id: EntityId) -> ClientResult<Milestone> {
        Self::fetch(self.request(Method::GET, &format!("/milestones/{id}")))
            .await
            .map_err(not_found_as("Milestone", id))
    }

    async fn create_milestone(&self, input: &NewMilestone) -> ClientResult<Milestone> {
        input.validate()?;
        Self::fetch(self.request(Method::POST, "/milestones").json(input)).await
    }

    async fn update_milestone(
        &self,
        id: EntityId,
        patch: &MilestonePatch,
    ) -> ClientResult<Milestone> {
        Self::fetch(self.request(Method::PATCH, &format!("/milestones/{id}")).json(patch))
            .await
            .map_err(not_found_as("Milestone", id))
    }

    async fn delete_milestone(&self, id: EntityId) -> ClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/milestones/{id}")))
            .await
            .map_err(not_found_as("Milestone", id))
    }

    // ---- users ----

    async fn list_tutors(&self) -> ClientResult<Vec<UserProfile>> {
        Self::fetch(self.request(Method::GET, "/users/tutors")).await
    }
}
