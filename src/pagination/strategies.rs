//! Pagination strategy implementations

use super::types::{NextPage, PaginationState, Paginator};
use reqwest::header::HeaderMap;

/// Header carrying the next page URL in Opsgenie responses
pub const PAGING_NEXT_HEADER: &str = "X-Paging-Next";

/// Next-page URL in a response header
///
/// The header value is used as-is; no parameters are re-applied to it.
/// A missing, empty or non-UTF-8 header ends pagination.
#[derive(Debug, Clone)]
pub struct HeaderPaginator {
    /// Header name to read
    pub header: String,
}

impl Default for HeaderPaginator {
    fn default() -> Self {
        Self::new(PAGING_NEXT_HEADER)
    }
}

impl HeaderPaginator {
    /// Create a paginator reading the given header
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl Paginator for HeaderPaginator {
    fn process_response(
        &self,
        headers: &HeaderMap,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_page(records_count);

        let next = headers
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match next {
            Some(url) => NextPage::Url(url.to_string()),
            None => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}
