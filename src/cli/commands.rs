use std::path::Path;
use std::time::Duration;

use super::args::{Cli, Commands, DetailSource};
use super::render::{render_detail, render_list, render_transcript};
use crate::client::{HttpLogApi, LogApi, watch_running};
use crate::config::Settings;
use crate::error::{LogViewError, Result};
use crate::logs::{RequestLogDetail, RequestStatus};
use crate::logs::time::offset_from_hours;
use crate::replay::{ReplayOptions, build_curl_with};
use crate::text::validate_strict_json;
use crate::transcript::{extract_visible_text, parse_transcript};
use crate::view::{LogsViewState, ViewAction, reduce};

pub async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let offset = offset_from_hours(settings.display.utc_offset_hours)?;

    match cli.command {
        Commands::List {
            status,
            provider,
            model,
            request_type,
            keyword,
            page,
            page_size,
        } => {
            let api = HttpLogApi::new(&settings)?;
            let status: Option<RequestStatus> = status
                .map(|s| serde_json::from_value(serde_json::Value::String(s)))
                .transpose()?;
            let actions = [
                ViewAction::SetStatus(status),
                ViewAction::SetProvider(provider),
                ViewAction::SetModel(model),
                ViewAction::SetRequestType(request_type),
                ViewAction::SetKeyword(keyword),
                ViewAction::SetPageSize(page_size),
                ViewAction::SetPage(page),
                ViewAction::ListRequested,
            ];
            let state = actions
                .into_iter()
                .fold(LogsViewState::default(), |s, a| reduce(&s, a));
            let Some(key) = state.pending_list_key() else {
                return Ok(());
            };
            let page = api.list_logs(&state.query).await?;
            let state = reduce(&state, ViewAction::ListLoaded { key, page });
            println!("{}", render_list(&state.list, &state.query, offset));
        }

        Commands::Show { id, watch } => {
            let api = HttpLogApi::new(&settings)?;
            let interval = watch.then(|| Duration::from_millis(settings.poll.interval_ms));
            let state = load_detail_view(&api, &id, interval).await?;
            let detail = state
                .detail
                .and_then(|d| d.record)
                .ok_or_else(|| LogViewError::NotFound(id.clone()))?;
            println!("{}", render_detail(&detail, offset));
        }

        Commands::Curl { source } => {
            let detail = load_detail(&settings, &source).await?;
            let opts = ReplayOptions::from(&settings.replay);
            println!("{}", build_curl_with(&detail, &opts));
        }

        Commands::Transcript { source, text } => {
            let detail = load_detail(&settings, &source).await?;
            if text {
                println!("{}", extract_visible_text(&detail.raw_sse));
            } else {
                println!("{}", render_transcript(&parse_transcript(&detail.raw_sse)));
            }
        }

        Commands::CheckJson { file } => {
            check_json_file(&file)?;
            println!("ok");
        }
    }

    Ok(())
}

fn apply_detail(state: &LogsViewState, detail: &RequestLogDetail) -> LogsViewState {
    let state = reduce(state, ViewAction::DetailRequested);
    match state.pending_detail_key() {
        Some(key) => reduce(
            &state,
            ViewAction::DetailLoaded {
                key,
                detail: Box::new(detail.clone()),
            },
        ),
        None => state,
    }
}

/// Opens one record in the view state. With an interval, keeps refreshing it while it
/// is still running.
async fn load_detail_view<A: LogApi + ?Sized>(
    api: &A,
    id: &str,
    interval: Option<Duration>,
) -> Result<LogsViewState> {
    let mut state = reduce(&LogsViewState::default(), ViewAction::OpenDetail(id.to_string()));
    match interval {
        Some(interval) => {
            watch_running(api, id, interval, |d| {
                state = apply_detail(&state, d);
                if state.should_poll_detail() {
                    eprintln!("{} still running…", d.id());
                }
            })
            .await?;
        }
        None => {
            let detail = api.get_log(id).await?;
            state = apply_detail(&state, &detail);
        }
    }
    Ok(state)
}

async fn load_detail(settings: &Settings, source: &DetailSource) -> Result<RequestLogDetail> {
    match (&source.file, &source.id) {
        (Some(path), _) => read_detail_file(path),
        (None, Some(id)) => HttpLogApi::new(settings)?.get_log(id).await,
        (None, None) => Err(LogViewError::Config("either <id> or --file is required".into())),
    }
}

fn check_json_file(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    validate_strict_json(&text).inspect_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "strict json rejected");
    })?;
    Ok(())
}

/// Accepts either a bare detail object or one wrapped in the API envelope.
pub fn read_detail_file(path: &Path) -> Result<RequestLogDetail> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let inner = match value.get("data") {
        Some(data) if value.get("success").is_some() => data.clone(),
        _ => value,
    };
    Ok(serde_json::from_value(inner)?)
}
