use std::sync::Arc;
use std::time::Duration;

use collab_core::case::Voter;
use collab_core::types::EntityId;

use crate::backend::Backend;
use crate::error::ClientResult;
use crate::http::HttpBackend;
use crate::mock::MockBackend;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default artificial latency of the mock backend in milliseconds.
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 300;

/// Default voter identity when none is configured.
pub const DEFAULT_USER_ID: EntityId = 1;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults that select the in-memory backend, so a bare
/// checkout works without a running API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL. `None` selects the mock backend.
    pub api_url: Option<String>,
    /// Force the mock backend even when a URL is configured.
    pub use_mock: bool,
    /// Bearer token sent with every HTTP request.
    pub api_token: Option<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Mock backend latency in milliseconds (default: `300`).
    pub mock_latency_ms: u64,
    /// Identity used when casting votes.
    pub user_id: EntityId,
    pub user_name: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            use_mock: false,
            api_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
            user_id: DEFAULT_USER_ID,
            user_name: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default        |
    /// |-------------------------------|----------------|
    /// | `COLLAB_API_URL`              | unset (mock)   |
    /// | `COLLAB_USE_MOCK`             | `false`        |
    /// | `COLLAB_API_TOKEN`            | unset          |
    /// | `COLLAB_REQUEST_TIMEOUT_SECS` | `30`           |
    /// | `COLLAB_MOCK_LATENCY_MS`      | `300`          |
    /// | `COLLAB_USER_ID`              | `1`            |
    /// | `COLLAB_USER_NAME`            | unset          |
    ///
    /// Unparseable numbers fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let parse_or = |key: &str, default: u64| -> u64 {
            match non_empty(key) {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    tracing::warn!(key, value = %raw, default, "Ignoring invalid numeric setting");
                    default
                }),
                None => default,
            }
        };

        let use_mock = non_empty("COLLAB_USE_MOCK")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let user_id = non_empty("COLLAB_USER_ID")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_USER_ID);

        Self {
            api_url: non_empty("COLLAB_API_URL"),
            use_mock,
            api_token: non_empty("COLLAB_API_TOKEN"),
            request_timeout_secs: parse_or(
                "COLLAB_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            mock_latency_ms: parse_or("COLLAB_MOCK_LATENCY_MS", DEFAULT_MOCK_LATENCY_MS),
            user_id,
            user_name: non_empty("COLLAB_USER_NAME"),
        }
    }

    /// Whether calls resolve against the in-memory dataset.
    pub fn uses_mock(&self) -> bool {
        self.use_mock || self.api_url.is_none()
    }

    /// The identity votes are cast under.
    pub fn voter(&self) -> Voter {
        Voter::new(self.user_id, self.user_name.clone())
    }
}

/// Build the backend selected by `config`.
pub fn build_backend(config: &ClientConfig) -> ClientResult<Arc<dyn Backend>> {
    match (&config.api_url, config.uses_mock()) {
        (Some(url), false) => {
            tracing::info!(api_url = %url, "Using HTTP backend");
            let backend = HttpBackend::new(
                url.clone(),
                config.api_token.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            Ok(Arc::new(backend))
        }
        _ => {
            tracing::info!(latency_ms = config.mock_latency_ms, "Using in-memory mock backend");
            Ok(Arc::new(MockBackend::seeded(Duration::from_millis(
                config.mock_latency_ms,
            ))))
        }
    }
}
