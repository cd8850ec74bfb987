use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LogViewError, Result};

pub const TOKEN_ENV: &str = "LOGVIEW_API_TOKEN";
pub const BASE_URL_ENV: &str = "LOGVIEW_API_BASE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            logs_path: default_logs_path(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_logs_path() -> String {
    "/api/logs/llm".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    // 展示时区偏移（小时），默认北京时间
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

fn default_utc_offset_hours() -> i32 {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_placeholder_url")]
    pub placeholder_url: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            placeholder_url: default_placeholder_url(),
        }
    }
}

pub fn default_placeholder_url() -> String {
    "https://YOUR_API_HOST/v1/chat/completions".to_string()
}

impl Settings {
    /// Loads settings from an explicit path, or from the first config file found in the
    /// working directory. A missing file yields defaults; environment overrides apply last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::find_config_file() {
                Some(path) => Self::from_file(&path)?,
                None => {
                    tracing::debug!("no config file found, using defaults");
                    Settings::default()
                }
            },
        };
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LogViewError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    fn find_config_file() -> Option<PathBuf> {
        let possible_names = ["logview.toml", "config.toml"];

        possible_names
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    fn apply_env_overrides(&mut self) {
        // .env 中的值同样生效；文件不存在时忽略
        let _ = dotenvy::dotenv();
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            self.api.token = Some(token.trim().to_string());
        }
        if let Ok(base) = std::env::var(BASE_URL_ENV)
            && !base.trim().is_empty()
        {
            self.api.base_url = base.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(LogViewError::Config("api.base_url must not be empty".into()));
        }
        if self.poll.interval_ms == 0 {
            return Err(LogViewError::Config("poll.interval_ms must be positive".into()));
        }
        if !(-14..=14).contains(&self.display.utc_offset_hours) {
            return Err(LogViewError::Config(format!(
                "display.utc_offset_hours out of range: {}",
                self.display.utc_offset_hours
            )));
        }
        Ok(())
    }

    pub fn logs_url(&self) -> String {
        format!(
            "{}/{}",
            self.api.base_url.trim_end_matches('/'),
            self.api.logs_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://logs.internal:9000/\"\n\n[poll]\ninterval_ms = 500"
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.api.base_url, "http://logs.internal:9000/");
        assert_eq!(settings.api.logs_path, "/api/logs/llm");
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.poll.interval_ms, 500);
        assert_eq!(settings.display.utc_offset_hours, 8);
        assert_eq!(
            settings.replay.placeholder_url,
            "https://YOUR_API_HOST/v1/chat/completions"
        );
        assert_eq!(settings.logs_url(), "http://logs.internal:9000/api/logs/llm");
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut settings = Settings::default();
        settings.poll.interval_ms = 0;
        assert!(matches!(settings.validate(), Err(LogViewError::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let mut settings = Settings::default();
        settings.display.utc_offset_hours = 20;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = ").unwrap();
        assert!(matches!(
            Settings::from_file(file.path()),
            Err(LogViewError::Toml(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Settings::from_file(&missing),
            Err(LogViewError::Config(_))
        ));
    }
}
