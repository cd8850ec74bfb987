use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

// 形如 [SYSTEM_PROMPT_REDACTED] 的占位符
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[A-Z][A-Z0-9_]*\]$").unwrap());
// 形如 "...[1234 chars trimmed]" 的截断后缀
static TRUNCATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\.\.\[\d+ chars trimmed\]$").unwrap());

pub const SYSTEM_KEYS: &[&str] = &[
    "system",
    "system_prompt",
    "systemPrompt",
    "system_instruction",
    "systemInstruction",
    "instructions",
];

pub fn is_placeholder(s: &str) -> bool {
    PLACEHOLDER.is_match(s.trim())
}

pub fn is_truncated(s: &str) -> bool {
    TRUNCATED.is_match(s.trim_end())
}

fn string_needs_restore(s: &str) -> bool {
    is_placeholder(s) || is_truncated(s)
}

// content 可能是字符串、[{text}] 数组或单个 {text} 对象
fn content_needs_restore(v: &Value) -> bool {
    match v {
        Value::String(s) => string_needs_restore(s),
        Value::Array(parts) => parts.iter().any(|p| {
            p.get("text")
                .and_then(Value::as_str)
                .is_some_and(string_needs_restore)
        }),
        Value::Object(_) => v
            .get("text")
            .and_then(Value::as_str)
            .is_some_and(string_needs_restore),
        _ => false,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

fn restore_system(obj: &mut Map<String, Value>, system_prompt: &str) -> bool {
    let mut changed = false;
    for key in SYSTEM_KEYS {
        if let Some(v) = obj.get_mut(*key)
            && content_needs_restore(v)
        {
            *v = Value::String(system_prompt.to_string());
            changed = true;
        }
    }
    if let Some(Value::Array(messages)) = obj.get_mut("messages") {
        for msg in messages.iter_mut() {
            if msg.get("role").and_then(Value::as_str) != Some("system") {
                continue;
            }
            if let Some(content) = msg.get_mut("content")
                && content_needs_restore(content)
            {
                *content = Value::String(system_prompt.to_string());
                changed = true;
            }
        }
    }
    changed
}

fn restore_question(obj: &mut Map<String, Value>, question: &str) -> bool {
    let Some(Value::Array(messages)) = obj.get_mut("messages") else {
        return false;
    };
    let Some(last_user) = messages
        .iter_mut()
        .rev()
        .find(|m| m.get("role").and_then(Value::as_str) == Some("user"))
    else {
        return false;
    };
    let Some(content) = last_user.get_mut("content") else {
        return false;
    };
    if !content.as_str().is_some_and(is_truncated) {
        return false;
    }
    *content = Value::String(question.to_string());
    true
}

/// Best-effort reconstruction of a redacted request body from side-channel plaintext.
///
/// Only the system prompt and the last user question are restored, and only from the
/// values given here. The input comes back byte-for-byte when it does not parse as a
/// JSON object or when nothing was replaced.
pub fn reconstruct(
    request_body_redacted: &str,
    system_prompt_text: Option<&str>,
    question_text: Option<&str>,
) -> String {
    let system_prompt = non_empty(system_prompt_text);
    let question = non_empty(question_text);
    if system_prompt.is_none() && question.is_none() {
        return request_body_redacted.to_string();
    }
    let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(request_body_redacted) else {
        return request_body_redacted.to_string();
    };

    let mut changed = false;
    if let Some(sp) = system_prompt {
        changed |= restore_system(&mut obj, sp);
    }
    if let Some(q) = question {
        changed |= restore_question(&mut obj, q);
    }
    if !changed {
        return request_body_redacted.to_string();
    }
    tracing::debug!("restored redacted request body fields");
    serde_json::to_string(&Value::Object(obj)).unwrap_or_else(|_| request_body_redacted.to_string())
}

fn is_usable_image_ref(v: &Value) -> bool {
    match v {
        Value::String(s) => !s.trim().is_empty() && !string_needs_restore(s),
        Value::Array(items) => items.iter().any(is_usable_image_ref),
        _ => false,
    }
}

/// Fills the `image` field from uploaded artifact URLs when the body says a reference
/// image was provided but carries no usable URL. One artifact gives a string, several
/// give an array; with no artifact the body is left alone.
pub fn inject_reference_image(request_body: &str, artifact_urls: &[String]) -> String {
    let urls: Vec<&str> = artifact_urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();
    if urls.is_empty() {
        return request_body.to_string();
    }
    let Ok(Value::Object(mut obj)) = serde_json::from_str::<Value>(request_body) else {
        return request_body.to_string();
    };
    if obj.get("initImageProvided").and_then(Value::as_bool) != Some(true) {
        return request_body.to_string();
    }
    if obj.get("image").is_some_and(is_usable_image_ref) {
        return request_body.to_string();
    }
    let image = match urls.as_slice() {
        [single] => Value::String(single.to_string()),
        many => Value::Array(many.iter().map(|u| Value::String(u.to_string())).collect()),
    };
    obj.insert("image".to_string(), image);
    serde_json::to_string(&Value::Object(obj)).unwrap_or_else(|_| request_body.to_string())
}
