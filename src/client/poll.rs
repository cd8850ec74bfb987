use std::time::Duration;

use crate::error::Result;
use crate::logs::RequestLogDetail;

use super::api::LogApi;

/// Re-fetches a log record every `interval` while its status is `running`, reporting
/// each snapshot to `on_update`. Returns the first non-running snapshot; a fetch error
/// ends the watch.
pub async fn watch_running<A, F>(
    api: &A,
    id: &str,
    interval: Duration,
    mut on_update: F,
) -> Result<RequestLogDetail>
where
    A: LogApi + ?Sized,
    F: FnMut(&RequestLogDetail),
{
    let mut polls: u32 = 0;
    loop {
        let detail = api.get_log(id).await.inspect_err(|e| {
            tracing::warn!(id, error = %e, "stopped watching log");
        })?;
        on_update(&detail);
        if !detail.status().is_running() {
            tracing::debug!(id, polls, status = %detail.status(), "log settled");
            return Ok(detail);
        }
        polls += 1;
        tokio::time::sleep(interval).await;
    }
}
