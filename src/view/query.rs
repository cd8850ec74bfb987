use crate::logs::RequestStatus;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Filters and pagination of the request-log list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsQuery {
    pub page: u32,
    pub page_size: u32,
    pub status: Option<RequestStatus>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub request_type: Option<String>,
    pub keyword: Option<String>,
}

impl Default for LogsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            status: None,
            provider: None,
            model: None,
            request_type: None,
            keyword: None,
        }
    }
}

// 空白筛选值视为未设置
pub(crate) fn clean_filter(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl LogsQuery {
    /// Query-string pairs in the backend's camelCase naming; unset filters are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("pageSize", self.page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(status) = &self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        let optional = [
            ("provider", &self.provider),
            ("model", &self.model),
            ("requestType", &self.request_type),
            ("keyword", &self.keyword),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                pairs.push((key, v.clone()));
            }
        }
        pairs
    }

    pub fn has_filters(&self) -> bool {
        self.status.is_some()
            || self.provider.is_some()
            || self.model.is_some()
            || self.request_type.is_some()
            || self.keyword.is_some()
    }

    pub fn total_pages(&self, total: u64) -> u32 {
        let size = u64::from(self.page_size.clamp(1, MAX_PAGE_SIZE));
        total.div_ceil(size).max(1).min(u64::from(u32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pairs_only_paginate() {
        assert_eq!(
            LogsQuery::default().to_query_pairs(),
            vec![("page", "1".to_string()), ("pageSize", "20".to_string())]
        );
    }

    #[test]
    fn filters_are_emitted_and_sizes_clamped() {
        let q = LogsQuery {
            page: 0,
            page_size: 10_000,
            status: Some(RequestStatus::Failed),
            provider: Some("claude".into()),
            keyword: Some("超时".into()),
            ..Default::default()
        };
        assert!(q.has_filters());
        assert_eq!(
            q.to_query_pairs(),
            vec![
                ("page", "1".to_string()),
                ("pageSize", "200".to_string()),
                ("status", "failed".to_string()),
                ("provider", "claude".to_string()),
                ("keyword", "超时".to_string()),
            ]
        );
    }

    #[test]
    fn page_count() {
        let q = LogsQuery::default();
        assert_eq!(q.total_pages(0), 1);
        assert_eq!(q.total_pages(20), 1);
        assert_eq!(q.total_pages(21), 2);
    }

    #[test]
    fn blank_filters_are_cleared() {
        assert_eq!(clean_filter(Some("  ".into())), None);
        assert_eq!(clean_filter(Some(" gpt ".into())), Some("gpt".into()));
    }
}
