pub mod settings;

pub use settings::{ApiConfig, DisplayConfig, PollConfig, ReplayConfig, Settings};
