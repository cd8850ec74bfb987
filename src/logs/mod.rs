pub mod classify;
pub mod time;
pub mod types;

pub use classify::{ErrorKind, ProviderFamily, RequestCategory};
pub use types::{
    ApiError, ApiResponse, ImageReference, LogPage, RequestLogDetail, RequestLogListItem,
    RequestStatus, TokenCount, UNKNOWN_MARKER, format_token_count,
};
