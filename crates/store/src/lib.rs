pub mod container;
pub mod reducers;
pub mod request;
pub mod selectors;
pub mod state;
pub mod store;

pub use container::EntityContainer;
pub use request::RequestStatus;
pub use state::AppState;
pub use store::{LoadReport, Store};
