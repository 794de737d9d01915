/// Lifecycle of one kind of request against a container.
///
/// Transitions are re-entrant: a container may go back to `Loading` from
/// any state, including `Loading` itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(String),
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }

    /// The stored error message, if the last request failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            RequestStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}
