use serde::Serialize;
use serde_json::Value;

/// Token usage normalized across provider spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UsageSummary {
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub input: Option<u64>,
    #[serde(rename = "out", skip_serializing_if = "Option::is_none")]
    pub output: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

const INPUT_KEYS: &[&str] = &["input_tokens", "prompt_tokens", "prompt_tokens_total"];
const OUTPUT_KEYS: &[&str] = &["output_tokens", "completion_tokens", "completion_tokens_total"];
const TOTAL_KEYS: &[&str] = &["total_tokens"];

fn first_u64(obj: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_u64))
}

// OpenAI 把 usage 放在顶层，Claude 的 message_start 放在 message.usage（宽松兼容各家）
pub fn parse_usage_from_value(v: &Value) -> Option<UsageSummary> {
    let u = v
        .get("usage")
        .filter(|u| u.is_object())
        .or_else(|| v.get("message").and_then(|m| m.get("usage")))
        .filter(|u| u.is_object())?;
    Some(UsageSummary {
        input: first_u64(u, INPUT_KEYS),
        output: first_u64(u, OUTPUT_KEYS),
        total: first_u64(u, TOTAL_KEYS),
    })
}
