//! Closed-set classification of free-text log fields.
//!
//! Every classifier is a table of lowercase substrings checked in order; the first
//! hit wins and nothing matching falls through to an explicit `Unknown`.

/// Upstream family guessed from a free-text provider name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    OpenAi,
    Anthropic,
    Unknown,
}

impl ProviderFamily {
    // 按名称子串判断，自建/自定义命名的平台可能被误判
    pub fn detect(provider: &str) -> Self {
        let p = provider.to_ascii_lowercase();
        if p.contains("claude") || p.contains("anthropic") {
            ProviderFamily::Anthropic
        } else if p.contains("openai") {
            ProviderFamily::OpenAi
        } else {
            ProviderFamily::Unknown
        }
    }

    pub fn uses_bearer_auth(provider: &str) -> bool {
        provider.to_ascii_lowercase().contains("openai")
    }

    pub fn uses_x_api_key(provider: &str) -> bool {
        matches!(Self::detect(provider), ProviderFamily::Anthropic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCategory {
    Chat,
    Intent,
    Vision,
    ImageGeneration,
    Embedding,
    Rerank,
    Unknown,
}

const CATEGORY_TABLE: &[(&str, RequestCategory)] = &[
    ("image_gen", RequestCategory::ImageGeneration),
    ("imagegen", RequestCategory::ImageGeneration),
    ("image-gen", RequestCategory::ImageGeneration),
    ("generation", RequestCategory::ImageGeneration),
    ("vision", RequestCategory::Vision),
    ("ocr", RequestCategory::Vision),
    ("embed", RequestCategory::Embedding),
    ("rerank", RequestCategory::Rerank),
    ("intent", RequestCategory::Intent),
    ("classify", RequestCategory::Intent),
    ("chat", RequestCategory::Chat),
    ("reasoning", RequestCategory::Chat),
    ("completion", RequestCategory::Chat),
];

impl RequestCategory {
    pub fn classify(request_type: &str) -> Self {
        let rt = request_type.trim().to_ascii_lowercase();
        if rt.is_empty() {
            return RequestCategory::Unknown;
        }
        CATEGORY_TABLE
            .iter()
            .find(|(needle, _)| rt.contains(needle))
            .map(|(_, cat)| *cat)
            .unwrap_or(RequestCategory::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestCategory::Chat => "chat",
            RequestCategory::Intent => "intent",
            RequestCategory::Vision => "vision",
            RequestCategory::ImageGeneration => "image-gen",
            RequestCategory::Embedding => "embedding",
            RequestCategory::Rerank => "rerank",
            RequestCategory::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    RateLimited,
    Auth,
    ContentFilter,
    Cancelled,
    Network,
    Upstream,
    Unknown,
}

const ERROR_TABLE: &[(&str, ErrorKind)] = &[
    ("timeout", ErrorKind::Timeout),
    ("timed out", ErrorKind::Timeout),
    ("deadline", ErrorKind::Timeout),
    ("超时", ErrorKind::Timeout),
    ("429", ErrorKind::RateLimited),
    ("rate limit", ErrorKind::RateLimited),
    ("rate_limit", ErrorKind::RateLimited),
    ("too many requests", ErrorKind::RateLimited),
    ("限流", ErrorKind::RateLimited),
    ("401", ErrorKind::Auth),
    ("403", ErrorKind::Auth),
    ("unauthorized", ErrorKind::Auth),
    ("forbidden", ErrorKind::Auth),
    ("invalid api key", ErrorKind::Auth),
    ("content_filter", ErrorKind::ContentFilter),
    ("content filter", ErrorKind::ContentFilter),
    ("safety", ErrorKind::ContentFilter),
    ("cancel", ErrorKind::Cancelled),
    ("aborted", ErrorKind::Cancelled),
    ("取消", ErrorKind::Cancelled),
    ("connection", ErrorKind::Network),
    ("dns", ErrorKind::Network),
    ("reset by peer", ErrorKind::Network),
    ("500", ErrorKind::Upstream),
    ("502", ErrorKind::Upstream),
    ("503", ErrorKind::Upstream),
    ("504", ErrorKind::Upstream),
    ("overloaded", ErrorKind::Upstream),
    ("upstream", ErrorKind::Upstream),
];

impl ErrorKind {
    pub fn classify(error: &str) -> Self {
        let e = error.trim().to_lowercase();
        if e.is_empty() {
            return ErrorKind::Unknown;
        }
        ERROR_TABLE
            .iter()
            .find(|(needle, _)| e.contains(needle))
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate-limited",
            ErrorKind::Auth => "auth",
            ErrorKind::ContentFilter => "content-filter",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Network => "network",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_family_by_substring() {
        assert_eq!(ProviderFamily::detect("Claude-Proxy"), ProviderFamily::Anthropic);
        assert_eq!(ProviderFamily::detect("anthropic"), ProviderFamily::Anthropic);
        assert_eq!(ProviderFamily::detect("OpenAI-compatible"), ProviderFamily::OpenAi);
        assert_eq!(ProviderFamily::detect("my-selfhosted"), ProviderFamily::Unknown);
        assert!(ProviderFamily::uses_bearer_auth("azure-openai"));
        assert!(!ProviderFamily::uses_x_api_key("azure-openai"));
    }

    #[test]
    fn request_categories() {
        assert_eq!(RequestCategory::classify("chat_stream"), RequestCategory::Chat);
        assert_eq!(RequestCategory::classify("Vision"), RequestCategory::Vision);
        assert_eq!(
            RequestCategory::classify("image_gen.create"),
            RequestCategory::ImageGeneration
        );
        assert_eq!(RequestCategory::classify("intent"), RequestCategory::Intent);
        assert_eq!(RequestCategory::classify(""), RequestCategory::Unknown);
        assert_eq!(RequestCategory::classify("mystery"), RequestCategory::Unknown);
    }

    #[test]
    fn error_kinds() {
        assert_eq!(ErrorKind::classify("upstream timed out after 60s"), ErrorKind::Timeout);
        assert_eq!(ErrorKind::classify("HTTP 429 Too Many Requests"), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::classify("401 Unauthorized"), ErrorKind::Auth);
        assert_eq!(ErrorKind::classify("request cancelled by client"), ErrorKind::Cancelled);
        assert_eq!(ErrorKind::classify("请求超时"), ErrorKind::Timeout);
        assert_eq!(ErrorKind::classify("HTTP 503"), ErrorKind::Upstream);
        assert_eq!(ErrorKind::classify("something odd"), ErrorKind::Unknown);
        assert_eq!(ErrorKind::classify("  "), ErrorKind::Unknown);
    }
}
