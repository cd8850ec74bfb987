pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logs;
pub mod replay;
pub mod text;
pub mod transcript;
pub mod view;

pub use error::{LogViewError, Result};
