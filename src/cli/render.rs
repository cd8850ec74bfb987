//! Plain-text rendering of log records for the terminal.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, Utc};

use crate::logs::time::{format_duration_ms, to_display_string};
use crate::logs::{
    ErrorKind, RequestCategory, RequestLogDetail, RequestLogListItem, UNKNOWN_MARKER,
};
use crate::text::{decode_escaped_text_for_display, try_pretty_json_text};
use crate::transcript::Transcript;
use crate::view::{ListState, LogsQuery};

const PREVIEW_MAX_CHARS: usize = 48;

fn or_marker(v: Option<&str>) -> &str {
    v.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(UNKNOWN_MARKER)
}

fn time_cell(dt: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    dt.map(|t| to_display_string(&t, offset))
        .unwrap_or_else(|| UNKNOWN_MARKER.to_string())
}

fn ms_cell(ms: Option<i64>) -> String {
    ms.map(format_duration_ms)
        .unwrap_or_else(|| UNKNOWN_MARKER.to_string())
}

fn preview(text: Option<&str>) -> String {
    let flat: String = or_marker(text)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() > PREVIEW_MAX_CHARS {
        let cut: String = flat.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{cut}…")
    } else {
        flat
    }
}

fn category(item: &RequestLogListItem) -> &'static str {
    RequestCategory::classify(item.request_type.as_deref().unwrap_or("")).label()
}

pub fn render_list(list: &ListState, query: &LogsQuery, offset: FixedOffset) -> String {
    let mut out = String::new();
    if list.items.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            if query.has_filters() { "no logs match the filters" } else { "no logs yet" }
        );
    }
    for item in &list.items {
        let _ = writeln!(
            out,
            "{id}  {started}  {status:<9}  {provider}/{model}  [{cat}]  in={input} out={output}  {dur}  {q}",
            id = item.id,
            started = time_cell(item.started_at, offset),
            status = item.status.as_str(),
            provider = or_marker(item.provider.as_deref()),
            model = or_marker(item.model.as_deref()),
            cat = category(item),
            input = item.input_tokens,
            output = item.output_tokens,
            dur = ms_cell(item.duration_ms()),
            q = preview(item.question_preview.as_deref()),
        );
    }
    let _ = write!(
        out,
        "page {}/{}, {} total",
        query.page.max(1),
        query.total_pages(list.total),
        list.total
    );
    out
}

pub fn render_detail(detail: &RequestLogDetail, offset: FixedOffset) -> String {
    let s = &detail.summary;
    let mut out = String::new();
    let _ = writeln!(out, "id:          {}", s.id);
    let _ = writeln!(out, "request id:  {}", or_marker(s.request_id.as_deref()));
    let _ = writeln!(out, "status:      {}", s.status);
    let _ = writeln!(
        out,
        "target:      {} {}{}",
        or_marker(s.provider.as_deref()),
        detail.api_base.as_deref().unwrap_or(""),
        detail.path.as_deref().unwrap_or("")
    );
    let _ = writeln!(out, "model:       {} [{}]", or_marker(s.model.as_deref()), category(s));
    let _ = writeln!(out, "started:     {}", time_cell(s.started_at, offset));
    let _ = writeln!(out, "first byte:  {}", ms_cell(s.first_byte_ms()));
    let _ = writeln!(out, "duration:    {}", ms_cell(s.duration_ms()));
    let _ = writeln!(
        out,
        "tokens:      in={} out={} cache_read={} cache_write={}",
        s.input_tokens, s.output_tokens, s.cache_read_input_tokens, s.cache_creation_input_tokens
    );
    if let Some(err) = s.error.as_deref().filter(|e| !e.trim().is_empty()) {
        let _ = writeln!(out, "error:       [{}] {}", ErrorKind::classify(err).label(), err.trim());
    }

    let sections = [
        ("system prompt", detail.system_prompt_text.as_deref()),
        ("question", detail.question_text.as_deref()),
        ("answer", detail.answer_text.as_deref()),
    ];
    for (title, body) in sections {
        if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
            let _ = writeln!(out, "\n--- {title} ---\n{}", decode_escaped_text_for_display(body));
        }
    }
    if let Some(body) = detail.request_body_redacted.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = writeln!(out, "\n--- request body ---\n{}", try_pretty_json_text(body));
    }
    for img in detail.input_images.iter().chain(&detail.output_images) {
        let _ = writeln!(out, "image: {} {}", img.label, img.url);
    }
    out.trim_end().to_string()
}

pub fn render_transcript(transcript: &Transcript) -> String {
    let mut out = String::new();
    for ev in &transcript.events {
        let _ = write!(out, "#{:<4} {}", ev.index, ev.kind.as_str());
        if let Some(reason) = &ev.finish_reason {
            let _ = write!(out, "  finish={reason}");
        }
        if let Some(keys) = &ev.delta_keys {
            let _ = write!(out, "  delta=[{}]", keys.join(","));
        }
        if let Some(usage) = &ev.usage
            && let Ok(json) = serde_json::to_string(usage)
        {
            let _ = write!(out, "  usage={json}");
        }
        if let Some(note) = &ev.note {
            let _ = write!(out, "  {note}");
        }
        out.push('\n');
    }
    let stats = &transcript.stats;
    let _ = write!(
        out,
        "{} events, done={}, usage={}",
        stats.total, stats.done, stats.has_usage
    );
    out
}
