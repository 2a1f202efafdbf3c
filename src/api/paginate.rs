//! Cursor pagination
//!
//! Walks a collection page by page until the service stops returning a
//! `next` cursor. Pages are fetched one after the other and their elements
//! are kept in the order the service returned them.

use super::client::ApiClient;
use super::cursor::{Cursor, Page};
use super::error::{Error, Result};
use super::path::ApiPath;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Fetch every element reachable from `start`
///
/// `fetch_page` is called once per page with the cursor for that page. Any
/// error aborts the traversal; elements from earlier pages are dropped.
pub async fn collect_pages<T, F, Fut>(start: Cursor, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Cursor) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all_elements = Vec::new();
    let mut cursor = start;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(cursor.clone()).await?;
        pages += 1;
        tracing::debug!("page {}: {} elements", pages, page.elements.len());

        all_elements.extend(page.elements);

        let Some(next) = page.next else {
            break;
        };
        if next == cursor {
            return Err(Error::StalledCursor);
        }
        cursor = next;
    }

    Ok(all_elements)
}

/// Fetch one page of a collection endpoint
pub async fn fetch_page<T: DeserializeOwned>(
    client: &ApiClient,
    collection: &str,
    cursor: &Cursor,
) -> Result<Page<T>> {
    let path = ApiPath::new([collection])?.query_pairs(cursor.query());
    client.get(&path).await
}

/// Fetch a whole collection endpoint, default page size
pub async fn fetch_all<T: DeserializeOwned>(client: &ApiClient, collection: &str) -> Result<Vec<T>> {
    collect_pages(Cursor::default(), |cursor| async move {
        fetch_page(client, collection, &cursor).await
    })
    .await
}
