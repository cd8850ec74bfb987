use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::error::{LogViewError, Result};
use crate::logs::{ApiResponse, LogPage, RequestLogDetail};
use crate::view::LogsQuery;

use super::http_client::client_for_api;

/// Read-only access to the request-log backend.
#[async_trait]
pub trait LogApi: Send + Sync {
    async fn list_logs(&self, query: &LogsQuery) -> Result<LogPage>;
    async fn get_log(&self, id: &str) -> Result<RequestLogDetail>;
}

pub struct HttpLogApi {
    client: reqwest::Client,
    logs_url: String,
    token: Option<String>,
}

impl HttpLogApi {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: client_for_api(&settings.api)?,
            logs_url: settings.logs_url(),
            token: settings.api.token.clone(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.client.get(url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl LogApi for HttpLogApi {
    async fn list_logs(&self, query: &LogsQuery) -> Result<LogPage> {
        let resp = self
            .get(&self.logs_url)
            .query(&query.to_query_pairs())
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(%status, page = query.page, "list logs");
        decode_envelope(status, &text, "logs")
    }

    async fn get_log(&self, id: &str) -> Result<RequestLogDetail> {
        let url = format!("{}/{}", self.logs_url, id.trim());
        let resp = self.get(&url).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(%status, id, "get log");
        decode_envelope(status, &text, id)
    }
}

// 解包 ApiResponse；404 与 NOT_FOUND 统一映射为 NotFound
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, text: &str, what: &str) -> Result<T> {
    if status == StatusCode::NOT_FOUND {
        return Err(LogViewError::NotFound(what.to_string()));
    }
    let envelope = match serde_json::from_str::<ApiResponse<T>>(text) {
        Ok(env) => env,
        Err(_) if !status.is_success() => return Err(extract_error(status, text)),
        Err(e) => return Err(e.into()),
    };
    if envelope.success && status.is_success() {
        return envelope.data.ok_or_else(|| LogViewError::Api {
            code: "EMPTY_DATA".into(),
            message: format!("response for {what} carried no data"),
        });
    }
    match envelope.error {
        Some(err) if err.code == "NOT_FOUND" => Err(LogViewError::NotFound(what.to_string())),
        Some(err) => Err(LogViewError::Api {
            code: err.code,
            message: err.message,
        }),
        None => Err(extract_error(status, text)),
    }
}

fn extract_error(status: StatusCode, text: &str) -> LogViewError {
    LogViewError::Api {
        code: format!("HTTP_{}", status.as_u16()),
        message: text.trim().to_string(),
    }
}
