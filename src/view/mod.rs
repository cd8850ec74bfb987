pub mod query;
pub mod state;

pub use query::{DEFAULT_PAGE_SIZE, LogsQuery, MAX_PAGE_SIZE};
pub use state::{DetailState, ListState, LogsViewState, RequestKey, ViewAction, reduce};
