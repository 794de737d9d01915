//! Pure derived views over container contents.
//!
//! Nothing here mutates state. Filters borrow from the input slice, sorts
//! work on any slice of owned or borrowed records, and aggregates return
//! plain values.

pub mod aggregate;
pub mod filter;
pub mod sort;

pub use aggregate::{dashboard_summary, DashboardSummary};
pub use filter::{matches_search, Filter};
pub use sort::SortDirection;
