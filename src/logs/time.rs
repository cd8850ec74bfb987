use crate::error::{LogViewError, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};

// 默认展示时区：北京时间 (UTC+8)
pub const DEFAULT_OFFSET_HOURS: i32 = 8;
pub const DEFAULT_OFFSET: FixedOffset = FixedOffset::east_opt(DEFAULT_OFFSET_HOURS * 3600).unwrap();
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn offset_from_hours(hours: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| LogViewError::TimeParse(format!("invalid utc offset: {hours}h")))
}

/// 将 UTC 时间转换为指定时区的人类友好格式
pub fn to_display_string(dt: &DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format(DATETIME_FORMAT).to_string()
}

/// 将 UTC 时间转换为 ISO-8601 / RFC3339（UTC, `Z`）
pub fn to_iso8601_utc_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// 从本地时间字符串（无时区）按给定偏移解析为 UTC 时间
pub fn parse_local_string(s: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let naive_dt = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| LogViewError::TimeParse(e.to_string()))?;
    let local = offset
        .from_local_datetime(&naive_dt)
        .single()
        .ok_or_else(|| LogViewError::TimeParse("Invalid local datetime".into()))?;
    Ok(local.with_timezone(&Utc))
}

/// 解析后端返回的时间字符串为 UTC：
/// - 优先 RFC3339 / ISO-8601（带时区偏移或 `Z`）
/// - 兼容 Postgres 常见字符串格式：`YYYY-MM-DD HH:mm:ss(.f)?(+/-offset)`
/// - 回退：无时区的本地时间（按默认展示时区解释）
pub fn parse_datetime_string(s: &str) -> Result<DateTime<Utc>> {
    parse_datetime_string_with(s, DEFAULT_OFFSET)
}

pub fn parse_datetime_string_with(s: &str, local: FixedOffset) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    fn normalize_trailing_offset(raw: &str) -> Option<String> {
        // 只看时间部分，避免把日期里的 '-' 当成偏移
        let time_start = raw.find(' ').or_else(|| raw.find('T'))?;
        let pos = time_start + raw[time_start..].rfind(['+', '-'])?;
        let (prefix, offset) = raw.split_at(pos);
        // 仅接受 +HH / +HHMM 形式的纯数字偏移
        if !offset[1..].bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match offset.len() {
            // +HH / -HH
            3 => Some(format!("{prefix}{offset}:00")),
            // +HHMM / -HHMM
            5 => Some(format!("{prefix}{}:{}", &offset[..3], &offset[3..])),
            _ => None,
        }
    }

    if let Some(stripped) = s.strip_suffix(" UTC") {
        let naive = NaiveDateTime::parse_from_str(stripped, DATETIME_FORMAT)
            .map_err(|e| LogViewError::TimeParse(e.to_string()))?;
        return Ok(Utc.from_utc_datetime(&naive));
    }

    let candidates = [Some(s.to_string()), normalize_trailing_offset(s)];
    for cand in candidates.into_iter().flatten() {
        for fmt in [
            "%Y-%m-%d %H:%M:%S%:z",
            "%Y-%m-%d %H:%M:%S%.f%:z",
            "%Y-%m-%d %H:%M:%S%z",
            "%Y-%m-%d %H:%M:%S%.f%z",
        ] {
            if let Ok(dt) = DateTime::parse_from_str(&cand, fmt) {
                return Ok(dt.with_timezone(&Utc));
            }
        }
    }

    parse_local_string(s, local)
}

/// Lenient serde adapter for optional backend timestamps: unparsable values become `None`.
pub fn deserialize_optional_datetime<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| match parse_datetime_string(s) {
            Ok(dt) => Some(dt),
            Err(e) => {
                tracing::debug!(value = s, error = %e, "ignoring unparsable timestamp");
                None
            }
        }))
}

/// Formats a millisecond duration compactly: `850ms`, `1.25s`, `2m05s`.
pub fn format_duration_ms(ms: i64) -> String {
    if ms < 1000 {
        return format!("{ms}ms");
    }
    if ms < 60_000 {
        return format!("{:.2}s", ms as f64 / 1000.0);
    }
    let secs = ms / 1000;
    format!("{}m{:02}s", secs / 60, secs % 60)
}

// tracing_subscriber 自定义时间格式：按配置的展示时区输出
pub struct DisplayTimer {
    offset: FixedOffset,
}

impl DisplayTimer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl tracing_subscriber::fmt::time::FormatTime for DisplayTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let s = to_display_string(&Utc::now(), self.offset);
        write!(w, "{}", s)
    }
}
