pub mod api;
pub mod http_client;
pub mod poll;

pub use api::{HttpLogApi, LogApi};
pub use poll::watch_running;
