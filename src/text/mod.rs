pub mod escape;
pub mod json;
pub mod shell;

pub use escape::decode_escaped_text_for_display;
pub use json::{StrictJsonError, try_pretty_json_text, validate_strict_json};
pub use shell::shell_single_quote;
