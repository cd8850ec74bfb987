use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time::deserialize_optional_datetime;

// 后端可能对缺失的集合字段返回 null，按默认值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// 未上报的 token 数展示为该标记，与上报的 0 区分
pub const UNKNOWN_MARKER: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Running,
    Succeeded,
    Failed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Running => "running",
            RequestStatus::Succeeded => "succeeded",
            RequestStatus::Failed => "failed",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Unknown => "unknown",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RequestStatus::Running)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token count as reported by upstream: `None` means "not reported", which is
/// not the same thing as a reported zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenCount(pub Option<i64>);

impl fmt::Display for TokenCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => f.write_str(UNKNOWN_MARKER),
        }
    }
}

pub fn format_token_count(count: Option<i64>) -> String {
    TokenCount(count).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    #[serde(default)]
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogListItem {
    pub id: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub request_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RequestStatus,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub first_byte_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub input_tokens: TokenCount,
    #[serde(default)]
    pub output_tokens: TokenCount,
    #[serde(default)]
    pub cache_read_input_tokens: TokenCount,
    #[serde(default)]
    pub cache_creation_input_tokens: TokenCount,
    #[serde(default)]
    pub question_preview: Option<String>,
    #[serde(default)]
    pub answer_preview: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn millis_between(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<i64> {
    let ms = (to? - from?).num_milliseconds();
    (ms >= 0).then_some(ms)
}

impl RequestLogListItem {
    /// Total wall time of the request, when both ends are known.
    pub fn duration_ms(&self) -> Option<i64> {
        millis_between(self.started_at, self.ended_at)
    }

    /// Time to first byte from upstream.
    pub fn first_byte_ms(&self) -> Option<i64> {
        millis_between(self.started_at, self.first_byte_at)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogDetail {
    #[serde(flatten)]
    pub summary: RequestLogListItem,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_headers_redacted: BTreeMap<String, String>,
    #[serde(default)]
    pub request_body_redacted: Option<String>,
    #[serde(default)]
    pub system_prompt_text: Option<String>,
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_sse: Vec<String>,
    #[serde(default)]
    pub document_chars: Option<i64>,
    #[serde(default)]
    pub system_prompt_chars: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_images: Vec<ImageReference>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_images: Vec<ImageReference>,
}

impl RequestLogDetail {
    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn status(&self) -> &RequestStatus {
        &self.summary.status
    }

    pub fn input_image_urls(&self) -> Vec<String> {
        self.input_images
            .iter()
            .map(|img| img.url.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<RequestLogListItem>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Envelope every backend JSON reply is wrapped in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zero_and_unknown_tokens_render_differently() {
        assert_eq!(format_token_count(Some(0)), "0");
        assert_eq!(format_token_count(None), UNKNOWN_MARKER);
        assert_ne!(format_token_count(Some(0)), format_token_count(None));
    }

    #[test]
    fn list_item_keeps_null_distinct_from_zero() {
        let item: RequestLogListItem = serde_json::from_str(
            r#"{"id":"a1","status":"succeeded","inputTokens":0,"outputTokens":null}"#,
        )
        .unwrap();
        assert_eq!(item.input_tokens, TokenCount(Some(0)));
        assert_eq!(item.output_tokens, TokenCount(None));
        assert_eq!(item.cache_read_input_tokens, TokenCount(None));
        assert_eq!(item.input_tokens.to_string(), "0");
        assert_eq!(item.output_tokens.to_string(), UNKNOWN_MARKER);
    }

    #[test]
    fn unknown_status_does_not_fail_decoding() {
        let item: RequestLogListItem =
            serde_json::from_str(r#"{"id":"a2","status":"queued"}"#).unwrap();
        assert_eq!(item.status, RequestStatus::Unknown);
    }

    #[test]
    fn detail_flattens_summary_and_computes_timings() {
        let detail: RequestLogDetail = serde_json::from_str(
            r#"{
                "id": "d1",
                "provider": "openai-main",
                "status": "running",
                "startedAt": "2026-01-20T10:20:30Z",
                "firstByteAt": "2026-01-20T10:20:30.450Z",
                "endedAt": "not a time",
                "requestHeadersRedacted": {"content-type": "application/json"},
                "rawSse": ["data: [DONE]"],
                "inputImages": [{"label": "ref", "url": " https://cdn/x.png "}, {"url": ""}]
            }"#,
        )
        .unwrap();
        assert_eq!(detail.id(), "d1");
        assert!(detail.status().is_running());
        assert_eq!(
            detail.summary.started_at,
            Some(Utc.with_ymd_and_hms(2026, 1, 20, 10, 20, 30).unwrap())
        );
        assert_eq!(detail.summary.ended_at, None);
        assert_eq!(detail.summary.first_byte_ms(), Some(450));
        assert_eq!(detail.summary.duration_ms(), None);
        assert_eq!(detail.input_image_urls(), vec!["https://cdn/x.png".to_string()]);
    }

    #[test]
    fn null_collections_fall_back_to_empty() {
        let detail: RequestLogDetail = serde_json::from_str(
            r#"{"id":"n1","status":null,"requestHeadersRedacted":null,"rawSse":null,"inputImages":null,"outputImages":null}"#,
        )
        .unwrap();
        assert_eq!(detail.status(), &RequestStatus::Unknown);
        assert!(detail.request_headers_redacted.is_empty());
        assert!(detail.raw_sse.is_empty());
        assert!(detail.input_images.is_empty());
        assert!(detail.output_images.is_empty());

        let page: LogPage = serde_json::from_str(r#"{"items":null,"total":0}"#).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn malformed_offset_timestamp_loads_as_unknown() {
        let item: RequestLogListItem = serde_json::from_str(
            r#"{"id":"x","startedAt":"2026-01-20 10:20:30-1é2","endedAt":"2026-01-20T10:20:31Z"}"#,
        )
        .unwrap();
        assert_eq!(item.started_at, None);
        assert!(item.ended_at.is_some());
        assert_eq!(item.duration_ms(), None);
    }

    #[test]
    fn negative_duration_is_dropped() {
        let item = RequestLogListItem {
            started_at: Some(Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 5).unwrap()),
            ended_at: Some(Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(item.duration_ms(), None);
    }
}
