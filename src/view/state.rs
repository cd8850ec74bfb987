//! List/detail view state for the request-log screen.
//!
//! State is immutable: every change goes through [`reduce`], which returns a new
//! state. Each fetch gets a fresh [`RequestKey`]; results carrying any other key are
//! stale (a newer request was issued, or the view was closed) and are dropped.

use crate::logs::{LogPage, RequestLogDetail, RequestLogListItem, RequestStatus};

use super::query::{LogsQuery, clean_filter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestKey(u64);

#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub items: Vec<RequestLogListItem>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DetailState {
    pub id: String,
    pub record: Option<RequestLogDetail>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LogsViewState {
    pub query: LogsQuery,
    pub list: ListState,
    pub detail: Option<DetailState>,
    last_key: u64,
    list_key: Option<RequestKey>,
    detail_key: Option<RequestKey>,
}

#[derive(Debug, Clone)]
pub enum ViewAction {
    SetStatus(Option<RequestStatus>),
    SetProvider(Option<String>),
    SetModel(Option<String>),
    SetRequestType(Option<String>),
    SetKeyword(Option<String>),
    ClearFilters,
    SetPage(u32),
    SetPageSize(u32),
    ListRequested,
    ListLoaded { key: RequestKey, page: LogPage },
    ListFailed { key: RequestKey, error: String },
    OpenDetail(String),
    DetailRequested,
    DetailLoaded { key: RequestKey, detail: Box<RequestLogDetail> },
    DetailFailed { key: RequestKey, error: String },
    CloseDetail,
}

impl LogsViewState {
    /// Key of the list fetch currently in flight.
    pub fn pending_list_key(&self) -> Option<RequestKey> {
        self.list_key.filter(|_| self.list.loading)
    }

    /// Key of the detail fetch currently in flight.
    pub fn pending_detail_key(&self) -> Option<RequestKey> {
        self.detail_key
            .filter(|_| self.detail.as_ref().is_some_and(|d| d.loading))
    }

    /// Whether the open detail is still running and should keep being refreshed.
    pub fn should_poll_detail(&self) -> bool {
        self.detail
            .as_ref()
            .and_then(|d| d.record.as_ref())
            .is_some_and(|r| r.status().is_running())
    }

    fn next_key(&mut self) -> RequestKey {
        self.last_key += 1;
        RequestKey(self.last_key)
    }

    fn with_query(mut self, f: impl FnOnce(&mut LogsQuery)) -> Self {
        f(&mut self.query);
        // 筛选条件变化后回到第一页
        self.query.page = 1;
        self
    }
}

pub fn reduce(state: &LogsViewState, action: ViewAction) -> LogsViewState {
    let mut next = state.clone();
    match action {
        ViewAction::SetStatus(status) => next.with_query(|q| q.status = status),
        ViewAction::SetProvider(v) => next.with_query(|q| q.provider = clean_filter(v)),
        ViewAction::SetModel(v) => next.with_query(|q| q.model = clean_filter(v)),
        ViewAction::SetRequestType(v) => next.with_query(|q| q.request_type = clean_filter(v)),
        ViewAction::SetKeyword(v) => next.with_query(|q| q.keyword = clean_filter(v)),
        ViewAction::ClearFilters => next.with_query(|q| {
            *q = LogsQuery {
                page_size: q.page_size,
                ..LogsQuery::default()
            }
        }),
        ViewAction::SetPage(page) => {
            next.query.page = page.max(1);
            next
        }
        ViewAction::SetPageSize(size) => next.with_query(|q| q.page_size = size.max(1)),
        ViewAction::ListRequested => {
            let key = next.next_key();
            next.list_key = Some(key);
            next.list.loading = true;
            next.list.error = None;
            next
        }
        ViewAction::ListLoaded { key, page } => {
            if next.list_key != Some(key) {
                tracing::debug!(?key, "dropping stale list response");
                return next;
            }
            next.list = ListState {
                items: page.items,
                total: page.total,
                loading: false,
                error: None,
            };
            next
        }
        ViewAction::ListFailed { key, error } => {
            if next.list_key != Some(key) {
                return next;
            }
            next.list.loading = false;
            next.list.error = Some(error);
            next
        }
        ViewAction::OpenDetail(id) => {
            next.detail = Some(DetailState {
                id,
                record: None,
                loading: false,
                error: None,
            });
            next.detail_key = None;
            next
        }
        ViewAction::DetailRequested => {
            if next.detail.is_none() {
                return next;
            }
            let key = next.next_key();
            next.detail_key = Some(key);
            if let Some(d) = next.detail.as_mut() {
                d.loading = true;
                d.error = None;
            }
            next
        }
        ViewAction::DetailLoaded { key, detail } => {
            if next.detail_key != Some(key) {
                tracing::debug!(?key, "dropping stale detail response");
                return next;
            }
            if let Some(d) = next.detail.as_mut()
                && d.id == detail.id()
            {
                d.record = Some(*detail);
                d.loading = false;
            }
            next
        }
        ViewAction::DetailFailed { key, error } => {
            if next.detail_key != Some(key) {
                return next;
            }
            if let Some(d) = next.detail.as_mut() {
                d.loading = false;
                d.error = Some(error);
            }
            next
        }
        ViewAction::CloseDetail => {
            next.detail = None;
            next.detail_key = None;
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> RequestLogListItem {
        RequestLogListItem {
            id: id.into(),
            ..Default::default()
        }
    }

    fn detail(id: &str, status: RequestStatus) -> Box<RequestLogDetail> {
        Box::new(RequestLogDetail {
            summary: RequestLogListItem {
                id: id.into(),
                status,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn filter_change_resets_page() {
        let s = reduce(&LogsViewState::default(), ViewAction::SetPage(4));
        assert_eq!(s.query.page, 4);
        let s = reduce(&s, ViewAction::SetProvider(Some(" claude ".into())));
        assert_eq!(s.query.page, 1);
        assert_eq!(s.query.provider.as_deref(), Some("claude"));
        let s = reduce(&s, ViewAction::SetPageSize(50));
        let s = reduce(&s, ViewAction::ClearFilters);
        assert_eq!(s.query.provider, None);
        assert_eq!(s.query.page_size, 50);
    }

    #[test]
    fn reduce_does_not_mutate_input() {
        let before = LogsViewState::default();
        let _ = reduce(&before, ViewAction::SetKeyword(Some("x".into())));
        assert_eq!(before.query, LogsQuery::default());
    }

    #[test]
    fn stale_list_response_is_ignored() {
        let s = reduce(&LogsViewState::default(), ViewAction::ListRequested);
        let first = s.pending_list_key().unwrap();
        let s = reduce(&s, ViewAction::ListRequested);
        let second = s.pending_list_key().unwrap();
        assert_ne!(first, second);

        let s = reduce(
            &s,
            ViewAction::ListLoaded {
                key: first,
                page: LogPage { items: vec![item("old")], total: 1, ..Default::default() },
            },
        );
        assert!(s.list.loading);
        assert!(s.list.items.is_empty());

        let s = reduce(
            &s,
            ViewAction::ListLoaded {
                key: second,
                page: LogPage { items: vec![item("new")], total: 7, ..Default::default() },
            },
        );
        assert!(!s.list.loading);
        assert_eq!(s.list.items[0].id, "new");
        assert_eq!(s.list.total, 7);
        assert_eq!(s.pending_list_key(), None);
    }

    #[test]
    fn list_failure_keeps_previous_items() {
        let s = reduce(&LogsViewState::default(), ViewAction::ListRequested);
        let k = s.pending_list_key().unwrap();
        let s = reduce(&s, ViewAction::ListLoaded { key: k, page: LogPage { items: vec![item("a")], total: 1, ..Default::default() } });
        let s = reduce(&s, ViewAction::ListRequested);
        let k = s.pending_list_key().unwrap();
        let s = reduce(&s, ViewAction::ListFailed { key: k, error: "boom".into() });
        assert_eq!(s.list.error.as_deref(), Some("boom"));
        assert_eq!(s.list.items.len(), 1);
    }

    #[test]
    fn detail_response_after_close_is_dropped() {
        let s = reduce(&LogsViewState::default(), ViewAction::OpenDetail("d1".into()));
        let s = reduce(&s, ViewAction::DetailRequested);
        let k = s.pending_detail_key().unwrap();
        let s = reduce(&s, ViewAction::CloseDetail);
        let s = reduce(&s, ViewAction::DetailLoaded { key: k, detail: detail("d1", RequestStatus::Succeeded) });
        assert!(s.detail.is_none());
    }

    #[test]
    fn detail_for_other_record_is_dropped() {
        let s = reduce(&LogsViewState::default(), ViewAction::OpenDetail("d1".into()));
        let s = reduce(&s, ViewAction::DetailRequested);
        let k1 = s.pending_detail_key().unwrap();
        let s = reduce(&s, ViewAction::OpenDetail("d2".into()));
        let s = reduce(&s, ViewAction::DetailRequested);
        let s = reduce(&s, ViewAction::DetailLoaded { key: k1, detail: detail("d1", RequestStatus::Running) });
        let d = s.detail.as_ref().unwrap();
        assert_eq!(d.id, "d2");
        assert!(d.record.is_none());
        assert!(d.loading);
    }

    #[test]
    fn polling_follows_running_status() {
        let s = reduce(&LogsViewState::default(), ViewAction::OpenDetail("d1".into()));
        assert!(!s.should_poll_detail());
        let s = reduce(&s, ViewAction::DetailRequested);
        let k = s.pending_detail_key().unwrap();
        let s = reduce(&s, ViewAction::DetailLoaded { key: k, detail: detail("d1", RequestStatus::Running) });
        assert!(s.should_poll_detail());
        let s = reduce(&s, ViewAction::DetailRequested);
        let k = s.pending_detail_key().unwrap();
        let s = reduce(&s, ViewAction::DetailLoaded { key: k, detail: detail("d1", RequestStatus::Succeeded) });
        assert!(!s.should_poll_detail());
    }

    #[test]
    fn detail_requested_without_open_detail_is_noop() {
        let s = reduce(&LogsViewState::default(), ViewAction::DetailRequested);
        assert_eq!(s.pending_detail_key(), None);
    }
}
