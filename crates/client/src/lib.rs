//! Remote data access layer for the collaboration dashboard.
//!
//! Every (entity, operation) pair is a method on the [`Backend`] trait.
//! [`HttpBackend`] talks to the REST API with [`reqwest`]; [`MockBackend`]
//! resolves the same calls against a seeded in-memory dataset when no
//! backend is configured.

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod seed;

pub use backend::Backend;
pub use config::{build_backend, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use mock::MockBackend;
