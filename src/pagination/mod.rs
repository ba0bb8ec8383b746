//! Pagination module
//!
//! Opsgenie hands back the next page as a fully parameterized URL in the
//! `X-Paging-Next` response header. The paginator reads that header and
//! tracks progress; the URL is opaque and only valid for one fetch
//! sequence.

mod strategies;
mod types;

pub use strategies::{HeaderPaginator, PAGING_NEXT_HEADER};
pub use types::{NextPage, PaginationState, Paginator};
