//! Domain records and record-level rules for the collaboration dashboard.
//!
//! This crate has zero internal deps so it can be shared by the remote data
//! access layer, the state store and any CLI tooling.

pub mod application;
pub mod case;
pub mod error;
pub mod meeting;
pub mod milestone;
pub mod project;
pub mod types;
pub mod user;
