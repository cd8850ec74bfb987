pub mod curl;
pub mod reconstruct;

pub use curl::{API_KEY_PLACEHOLDER, ReplayOptions, build_curl, build_curl_with, replay_body};
pub use reconstruct::{inject_reference_image, is_placeholder, is_truncated, reconstruct};
