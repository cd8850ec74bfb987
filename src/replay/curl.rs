use crate::config::settings::default_placeholder_url;
use crate::logs::{ProviderFamily, RequestLogDetail};
use crate::text::{shell_single_quote, try_pretty_json_text};

use super::reconstruct::{inject_reference_image, reconstruct};

pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

// 重放时失效的头
const DROPPED_HEADERS: &[&str] = &["content-length", "host", "cookie"];
// 其余凭据类头：保留头名，值替换为占位符
const MASKED_HEADERS: &[&str] = &["api-key", "x-goog-api-key", "proxy-authorization"];

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub placeholder_url: String,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            placeholder_url: default_placeholder_url(),
        }
    }
}

impl From<&crate::config::ReplayConfig> for ReplayOptions {
    fn from(cfg: &crate::config::ReplayConfig) -> Self {
        Self {
            placeholder_url: cfg.placeholder_url.clone(),
        }
    }
}

fn target_url(detail: &RequestLogDetail, opts: &ReplayOptions) -> String {
    let base = detail.api_base.as_deref().unwrap_or("").trim();
    let path = detail.path.as_deref().unwrap_or("").trim();
    let url = format!("{base}{path}");
    if url.is_empty() {
        opts.placeholder_url.clone()
    } else {
        url
    }
}

fn replay_headers(detail: &RequestLogDetail) -> Vec<(String, String)> {
    let provider = detail.summary.provider.as_deref().unwrap_or("");
    let mut had_authorization = false;
    let mut had_x_api_key = false;
    let mut has_content_type = false;
    let mut passthrough = Vec::new();

    for (name, value) in &detail.request_headers_redacted {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "authorization" => had_authorization = true,
            "x-api-key" => had_x_api_key = true,
            n if DROPPED_HEADERS.contains(&n) => {}
            n if MASKED_HEADERS.contains(&n) => {
                passthrough.push((name.trim().to_string(), API_KEY_PLACEHOLDER.to_string()))
            }
            n => {
                if n == "content-type" {
                    has_content_type = true;
                }
                passthrough.push((name.trim().to_string(), value.clone()));
            }
        }
    }

    let mut headers = Vec::with_capacity(passthrough.len() + 3);
    if had_authorization || ProviderFamily::uses_bearer_auth(provider) {
        headers.push((
            "Authorization".to_string(),
            format!("Bearer {API_KEY_PLACEHOLDER}"),
        ));
    }
    if had_x_api_key || ProviderFamily::uses_x_api_key(provider) {
        headers.push(("x-api-key".to_string(), API_KEY_PLACEHOLDER.to_string()));
    }
    headers.extend(passthrough);
    if !has_content_type {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }
    headers
}

/// Request body to replay: reconstructed from side-channel text, then pretty-printed
/// when it is JSON. `None` when there is no body at all.
pub fn replay_body(detail: &RequestLogDetail) -> Option<String> {
    let raw = detail.request_body_redacted.as_deref().unwrap_or("");
    if raw.trim().is_empty() {
        return None;
    }
    let restored = reconstruct(
        raw,
        detail.system_prompt_text.as_deref(),
        detail.question_text.as_deref(),
    );
    let restored = inject_reference_image(&restored, &detail.input_image_urls());
    if serde_json::from_str::<serde_json::Value>(&restored).is_ok() {
        Some(try_pretty_json_text(&restored))
    } else {
        Some(restored.trim().to_string())
    }
}

pub fn build_curl(detail: &RequestLogDetail) -> String {
    build_curl_with(detail, &ReplayOptions::default())
}

/// Builds a `curl -X POST` command equivalent to the logged request. Credentials are
/// always placeholders and every argument is single-quoted.
pub fn build_curl_with(detail: &RequestLogDetail, opts: &ReplayOptions) -> String {
    let mut parts = vec![format!(
        "curl -X POST {}",
        shell_single_quote(&target_url(detail, opts))
    )];
    for (name, value) in replay_headers(detail) {
        parts.push(format!("-H {}", shell_single_quote(&format!("{name}: {value}"))));
    }
    if let Some(body) = replay_body(detail) {
        parts.push(format!("--data-raw {}", shell_single_quote(&body)));
    }
    parts.join(" \\\n  ")
}
