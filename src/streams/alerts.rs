//! Opsgenie alerts listing

use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::{HeaderPaginator, NextPage, PaginationState, Paginator};
use crate::types::{parse_timestamp, JsonValue};
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, info};

/// Records requested per page
pub const PAGE_SIZE: u32 = 100;

/// Where the next request goes
enum Cursor {
    First { bookmark: String },
    Next(String),
    Done,
}

struct FetchState {
    cursor: Cursor,
    paginator: HeaderPaginator,
    pagination: PaginationState,
}

/// Search filter combining the configured query with the bookmark
pub fn alerts_query(query: &str, bookmark: &str) -> Result<String> {
    let epoch = parse_timestamp(bookmark)?.timestamp();
    Ok(format!("{query} updatedAt>{epoch}"))
}

fn first_page_params(config: &TapConfig, bookmark: &str) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        ("query", alerts_query(&config.query, bookmark)?),
        ("offset", "0".to_string()),
        ("limit", PAGE_SIZE.to_string()),
        ("sort", "updatedAt".to_string()),
        ("order", "asc".to_string()),
    ])
}

fn page_records(body: JsonValue) -> Result<Vec<JsonValue>> {
    match body {
        JsonValue::Object(mut map) => match map.remove("data") {
            Some(JsonValue::Array(records)) => Ok(records),
            Some(_) => Err(Error::decode("'data' in alerts response is not an array")),
            None => Err(Error::decode("alerts response has no 'data' field")),
        },
        _ => Err(Error::decode("alerts response is not a JSON object")),
    }
}

/// Fetch alerts updated after `bookmark`, one page per item.
///
/// The first request carries the search filter and paging parameters.
/// Every later request is the `X-Paging-Next` URL exactly as returned;
/// the sequence ends when a response has no such header.
pub fn fetch_alert_pages<'a>(
    client: &'a HttpClient,
    config: &'a TapConfig,
    bookmark: &str,
) -> impl Stream<Item = Result<Vec<JsonValue>>> + 'a {
    let initial = FetchState {
        cursor: Cursor::First {
            bookmark: bookmark.to_string(),
        },
        paginator: HeaderPaginator::default(),
        pagination: PaginationState::new(),
    };

    stream::try_unfold(initial, move |mut state| async move {
        let response = match state.cursor {
            Cursor::Done => return Ok::<_, Error>(None),
            Cursor::First { ref bookmark } => {
                let params = first_page_params(config, bookmark)?;
                client.get(&config.alerts_url(), &params).await?
            }
            Cursor::Next(ref url) => client.get(url, &[]).await?,
        };

        let headers = response.headers;
        let records = page_records(response.body)?;

        state.cursor = match state.paginator.process_response(
            &headers,
            records.len(),
            &mut state.pagination,
        ) {
            NextPage::Url(url) => {
                info!("Next page: {url}");
                Cursor::Next(url)
            }
            NextPage::Done => {
                info!("Next page: none");
                debug!(
                    "Fetched {} alerts in {} pages",
                    state.pagination.records_fetched, state.pagination.pages_fetched
                );
                Cursor::Done
            }
        };

        Ok(Some((records, state)))
    })
}

/// Fetch alerts updated after `bookmark` as a flat record sequence
pub fn fetch_alerts<'a>(
    client: &'a HttpClient,
    config: &'a TapConfig,
    bookmark: &str,
) -> impl Stream<Item = Result<JsonValue>> + 'a {
    fetch_alert_pages(client, config, bookmark)
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, Error>)))
        .try_flatten()
}
