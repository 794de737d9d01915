use collab_core::application::{Application, ApplicationBrief};
use collab_core::case::{Case, CaseBrief};
use collab_core::meeting::Meeting;
use collab_core::milestone::Milestone;
use collab_core::project::{Project, ProjectBrief};
use collab_core::user::UserProfile;

use crate::container::EntityContainer;

/// Everything the dashboard has fetched, one container per entity.
///
/// Owned by a single [`Store`](crate::store::Store); containers are
/// independent and never updated together.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub projects: EntityContainer<ProjectBrief, Project>,
    pub meetings: EntityContainer<Meeting>,
    pub cases: EntityContainer<CaseBrief, Case>,
    pub applications: EntityContainer<ApplicationBrief, Application>,
    pub milestones: EntityContainer<Milestone>,
    pub tutors: EntityContainer<UserProfile>,
}

impl AppState {
    /// Error strings of every container, labelled by entity.
    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        [
            ("projects", self.projects.error()),
            ("meetings", self.meetings.error()),
            ("cases", self.cases.error()),
            ("applications", self.applications.error()),
            ("milestones", self.milestones.error()),
            ("tutors", self.tutors.error()),
        ]
        .into_iter()
        .filter_map(|(name, error)| error.map(|e| (name, e)))
        .collect()
    }
}
