use serde_json::Value;
use thiserror::Error;

/// Pretty-prints `text` as JSON with two-space indentation.
///
/// Anything that does not parse is returned as-is; an empty input stays empty.
pub fn try_pretty_json_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// Why a value failed strict JSON validation. `Display` is the user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrictJsonError {
    #[error("内容为空")]
    Empty,
    #[error("代码块格式不正确（需要成对的 ``` 围栏）")]
    MalformedFence,
    #[error("必须以 {{ 或 [ 开头，并以对应的 }} 或 ] 结尾")]
    WrongDelimiter,
    #[error("JSON 解析失败：{0}")]
    Parse(String),
}

const FENCE: &str = "```";

// 去掉单个 ``` 代码块外壳；没有围栏时原样返回
fn unwrap_fence(trimmed: &str) -> Result<&str, StrictJsonError> {
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return Ok(trimmed);
    };
    // 语言标签（如 ```json）必须独占首行
    let Some(newline) = rest.find('\n') else {
        return Err(StrictJsonError::MalformedFence);
    };
    let tag = rest[..newline].trim();
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(StrictJsonError::MalformedFence);
    }
    let body = &rest[newline + 1..];
    let Some(inner) = body.trim_end().strip_suffix(FENCE) else {
        return Err(StrictJsonError::MalformedFence);
    };
    if inner.contains(FENCE) {
        return Err(StrictJsonError::MalformedFence);
    }
    Ok(inner)
}

/// Accepts `text` only if it is a JSON object or array, optionally wrapped in one
/// fenced code block.
pub fn validate_strict_json(text: &str) -> Result<(), StrictJsonError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StrictJsonError::Empty);
    }
    let inner = unwrap_fence(trimmed)?.trim();
    if inner.is_empty() {
        return Err(StrictJsonError::Empty);
    }
    let delimited = (inner.starts_with('{') && inner.ends_with('}'))
        || (inner.starts_with('[') && inner.ends_with(']'));
    if !delimited {
        return Err(StrictJsonError::WrongDelimiter);
    }
    serde_json::from_str::<Value>(inner)
        .map(|_| ())
        .map_err(|e| StrictJsonError::Parse(e.to_string()))
}
