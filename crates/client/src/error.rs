use collab_core::error::CoreError;

/// Errors from the remote data access layer.
///
/// Wraps [`CoreError`] for domain failures (not found, client-side
/// validation) and adds the transport-level variants.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A domain-level error from `collab_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The HTTP request itself failed (unreachable host, DNS, TLS, timeout,
    /// undecodable body).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the raw body when it is not JSON.
        message: String,
    },
}

/// Convenience alias for backend return values.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether this error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Core(CoreError::NotFound { .. }))
            || matches!(self, ClientError::Api { status: 404, .. })
    }
}
