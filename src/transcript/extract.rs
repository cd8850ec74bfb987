use serde_json::Value;

/// One provider shape that can carry an incremental text delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaExtractor {
    /// `choices[0].delta.content`
    OpenAiChoiceDelta,
    /// `content_block_delta` events and any other payload with `delta.text`
    ClaudeContentBlockDelta,
    /// a plain top-level `content` string
    TopLevelContent,
}

/// Extractors in the order they are tried.
pub const EXTRACTORS: [DeltaExtractor; 3] = [
    DeltaExtractor::OpenAiChoiceDelta,
    DeltaExtractor::ClaudeContentBlockDelta,
    DeltaExtractor::TopLevelContent,
];

impl DeltaExtractor {
    pub fn extract<'a>(&self, payload: &'a Value) -> Option<&'a str> {
        match self {
            DeltaExtractor::OpenAiChoiceDelta => payload
                .get("choices")?
                .get(0)?
                .get("delta")?
                .get("content")?
                .as_str(),
            DeltaExtractor::ClaudeContentBlockDelta => {
                payload.get("delta")?.get("text")?.as_str()
            }
            DeltaExtractor::TopLevelContent => payload.get("content")?.as_str(),
        }
    }
}

/// First non-empty delta text found by [`EXTRACTORS`], if any.
pub fn extract_delta_text(payload: &Value) -> Option<&str> {
    EXTRACTORS
        .iter()
        .filter_map(|ex| ex.extract(payload))
        .find(|s| !s.is_empty())
}
