//! Parsing of stored provider streaming transcripts (SSE `data:` lines).
//!
//! Stored lines are not trusted to be one event each: the storage layer may have
//! joined several events into a single line, and non-SSE noise shows up too.
//! Parsing never fails; anything unexpected becomes a flagged event.

pub mod extract;
pub mod usage;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub use extract::{DeltaExtractor, EXTRACTORS, extract_delta_text};
pub use usage::{UsageSummary, parse_usage_from_value};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";
pub const LINE_NOTE_MAX_CHARS: usize = 160;
pub const INVALID_JSON_NOTE: &str = "invalid json";

// 空白后紧跟 data: 的位置即事件边界
static EVENT_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\sdata:").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Done,
    Data,
    Line,
    /// Provider event type taken from the payload's `type` or `object` field.
    Typed(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Done => "DONE",
            EventKind::Data => "data",
            EventKind::Line => "line",
            EventKind::Typed(t) => t,
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    /// 1-based position in the split input.
    pub index: usize,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ParsedEvent {
    fn new(index: usize, kind: EventKind) -> Self {
        Self {
            index,
            kind,
            finish_reason: None,
            delta_keys: None,
            usage: None,
            note: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptStats {
    pub total: usize,
    pub done: bool,
    pub has_usage: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Transcript {
    pub events: Vec<ParsedEvent>,
    pub stats: TranscriptStats,
}

impl Transcript {
    /// Last usage summary reported in the stream.
    pub fn usage(&self) -> Option<UsageSummary> {
        self.events.iter().rev().find_map(|e| e.usage)
    }

    /// Last finish reason reported in the stream.
    pub fn finish_reason(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find_map(|e| e.finish_reason.as_deref())
    }
}

/// Splits one stored line at every `data:` that follows whitespace, so events the
/// storage layer concatenated are seen separately again.
pub fn split_events(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for m in EVENT_BOUNDARY.find_iter(line) {
        let cut = m.end() - DATA_PREFIX.len();
        parts.push(&line[start..cut]);
        start = cut;
    }
    parts.push(&line[start..]);
    parts
}

fn segments<'a, S: AsRef<str>>(lines: &'a [S]) -> impl Iterator<Item = &'a str> {
    lines
        .iter()
        .flat_map(|l| split_events(l.as_ref()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn event_kind(payload: &Value) -> EventKind {
    ["type", "object"]
        .iter()
        .find_map(|k| payload.get(*k).and_then(Value::as_str))
        .map(|t| EventKind::Typed(t.to_string()))
        .unwrap_or(EventKind::Data)
}

fn parse_data_payload(index: usize, payload: &str) -> ParsedEvent {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(v) => v,
        Err(_) => {
            let mut ev = ParsedEvent::new(index, EventKind::Data);
            ev.note = Some(INVALID_JSON_NOTE.to_string());
            return ev;
        }
    };

    let mut ev = ParsedEvent::new(index, event_kind(&value));
    if let Some(choice) = value.get("choices").and_then(|c| c.get(0)) {
        ev.delta_keys = choice
            .get("delta")
            .and_then(Value::as_object)
            .map(|d| d.keys().cloned().collect());
        ev.finish_reason = choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    ev.usage = parse_usage_from_value(&value);
    ev
}

/// Segments, classifies and summarizes a stored streaming transcript.
pub fn parse_transcript<S: AsRef<str>>(lines: &[S]) -> Transcript {
    let mut transcript = Transcript::default();
    for (i, seg) in segments(lines).enumerate() {
        let index = i + 1;
        let event = match seg.strip_prefix(DATA_PREFIX) {
            Some(rest) => {
                let rest = rest.trim();
                if rest == DONE_SENTINEL {
                    transcript.stats.done = true;
                    ParsedEvent::new(index, EventKind::Done)
                } else {
                    parse_data_payload(index, rest)
                }
            }
            None => {
                let mut ev = ParsedEvent::new(index, EventKind::Line);
                ev.note = Some(truncate_chars(seg, LINE_NOTE_MAX_CHARS));
                ev
            }
        };
        if event.usage.is_some() {
            transcript.stats.has_usage = true;
        }
        transcript.events.push(event);
    }
    transcript.stats.total = transcript.events.len();
    tracing::trace!(
        total = transcript.stats.total,
        done = transcript.stats.done,
        "parsed transcript"
    );
    transcript
}

/// Concatenates the visible text deltas of a transcript, in order, with no separator.
pub fn extract_visible_text<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for seg in segments(lines) {
        let Some(rest) = seg.strip_prefix(DATA_PREFIX) else {
            continue;
        };
        let rest = rest.trim();
        if rest == DONE_SENTINEL {
            continue;
        }
        if let Ok(v) = serde_json::from_str::<Value>(rest)
            && let Some(text) = extract_delta_text(&v)
        {
            out.push_str(text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_counts_done() {
        let t = parse_transcript(&[r#"data: {"a":1}"#, r#"data: {"a":2}"#, "data: [DONE]"]);
        assert_eq!(t.stats.total, 3);
        assert!(t.stats.done);
        assert!(!t.stats.has_usage);
        let kinds: Vec<_> = t.events.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, ["data", "data", "DONE"]);
        let idx: Vec<_> = t.events.iter().map(|e| e.index).collect();
        assert_eq!(idx, [1, 2, 3]);
    }

    #[test]
    fn concatenates_openai_deltas() {
        let lines = [
            r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#,
            r#"data: {"choices":[{"delta":{"content":"lo"}}]}"#,
            "data: [DONE]",
        ];
        assert_eq!(extract_visible_text(&lines), "Hello");
    }

    #[test]
    fn unmerges_concatenated_events() {
        let merged = r#"data: {"choices":[{"delta":{"content":"A"}}]} data: {"choices":[{"delta":{"content":"B"}}]}
data: [DONE]"#;
        let t = parse_transcript(&[merged]);
        assert_eq!(t.stats.total, 3);
        assert!(t.stats.done);
        assert_eq!(extract_visible_text(&[merged]), "AB");
    }

    #[test]
    fn data_inside_payload_text_is_not_a_boundary_without_whitespace() {
        let line = r#"data: {"content":"metadata:x"}"#;
        assert_eq!(split_events(line).len(), 1);
        assert_eq!(extract_visible_text(&[line]), "metadata:x");
    }

    #[test]
    fn extracts_kind_finish_reason_and_delta_keys() {
        let t = parse_transcript(&[
            r#"data: {"object":"chat.completion.chunk","choices":[{"delta":{"role":"assistant","content":""},"finish_reason":null}]}"#,
            r#"data: {"object":"chat.completion.chunk","choices":[{"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":5,"completion_tokens":2,"total_tokens":7}}"#,
        ]);
        assert_eq!(t.events[0].kind, EventKind::Typed("chat.completion.chunk".into()));
        assert_eq!(
            t.events[0].delta_keys.as_deref(),
            Some(&["role".to_string(), "content".to_string()][..])
        );
        assert_eq!(t.events[0].finish_reason, None);
        assert_eq!(t.events[1].finish_reason.as_deref(), Some("stop"));
        assert!(t.stats.has_usage);
        assert_eq!(
            t.usage(),
            Some(UsageSummary { input: Some(5), output: Some(2), total: Some(7) })
        );
        assert_eq!(t.finish_reason(), Some("stop"));
    }

    #[test]
    fn claude_stream() {
        let lines = [
            "event: message_start",
            r#"data: {"type":"message_start","message":{"usage":{"input_tokens":9,"output_tokens":1}}}"#,
            r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"你"}}"#,
            r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"好"}}"#,
            r#"data: {"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":3}}"#,
        ];
        let t = parse_transcript(&lines);
        assert_eq!(t.stats.total, 5);
        assert!(!t.stats.done);
        assert!(t.stats.has_usage);
        assert_eq!(t.events[0].kind, EventKind::Line);
        assert_eq!(t.events[0].note.as_deref(), Some("event: message_start"));
        assert_eq!(t.events[1].kind.as_str(), "message_start");
        assert_eq!(t.events[1].usage.and_then(|u| u.input), Some(9));
        assert_eq!(extract_visible_text(&lines), "你好");
    }

    #[test]
    fn invalid_json_is_flagged_and_parsing_continues() {
        let t = parse_transcript(&["data: {broken", "", "   ", r#"data: {"type":"ping"}"#]);
        assert_eq!(t.stats.total, 2);
        assert_eq!(t.events[0].kind, EventKind::Data);
        assert_eq!(t.events[0].note.as_deref(), Some(INVALID_JSON_NOTE));
        assert_eq!(t.events[1].index, 2);
        assert_eq!(t.events[1].kind.as_str(), "ping");
    }

    #[test]
    fn noise_lines_are_truncated() {
        let noise = "x".repeat(500);
        let t = parse_transcript(&[noise.as_str()]);
        assert_eq!(t.events[0].kind, EventKind::Line);
        assert_eq!(t.events[0].note.as_ref().map(|n| n.chars().count()), Some(160));
    }

    #[test]
    fn never_panics_on_garbage() {
        let garbage = ["\u{0}\u{ffff}data:", "data:", "data:    ", "\t data: data: [DONE]"];
        let t = parse_transcript(&garbage);
        assert!(t.stats.done);
        assert_eq!(t.stats.total, t.events.len());
        assert_eq!(extract_visible_text(&garbage), "");
        let empty: [&str; 0] = [];
        assert_eq!(parse_transcript(&empty), Transcript::default());
    }

    #[test]
    fn serializes_kind_as_tag() {
        let t = parse_transcript(&["data: [DONE]"]);
        let v = serde_json::to_value(&t.events[0]).unwrap();
        assert_eq!(v, serde_json::json!({"index": 1, "kind": "DONE"}));
    }
}
