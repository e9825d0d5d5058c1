//! Whole-collection retrieval over the paginated backend.

use serde::de::DeserializeOwned;
use tracing::{field, instrument, trace, Span};

use jotter_core::defaults::MAX_PAGES;
use jotter_core::{logging, CollectionFilter, Error, ItemKind, NoteBackend, PageQuery, Result};

/// Fetch every record of `kind` matching `filter`, following pages in order.
///
/// Returns all records or an error; a failure on any page discards the pages
/// already fetched. Records keep the order the backend returned them in.
#[instrument(
    skip(backend, filter, fields),
    fields(subsystem = "ops", component = "fetcher", op = "fetch_all", kind = %kind, item_count = field::Empty)
)]
pub async fn fetch_all<B, T>(
    backend: &B,
    kind: ItemKind,
    filter: &CollectionFilter,
    fields: &[&str],
    page_limit: u32,
) -> Result<Vec<T>>
where
    B: NoteBackend + ?Sized,
    T: DeserializeOwned,
{
    let mut items: Vec<T> = Vec::new();
    let mut page = 1;

    loop {
        if page > MAX_PAGES {
            return Err(Error::UnexpectedResponse(format!(
                "{} listing still reports more data after {} pages",
                kind, MAX_PAGES
            )));
        }

        let query = PageQuery::new(filter.clone(), fields, page, page_limit);
        let raw = backend.fetch_page(kind, &query).await?;
        let has_more = raw.has_more;
        let decoded = raw.decode::<T>()?;

        if has_more && decoded.items.is_empty() {
            return Err(Error::UnexpectedResponse(format!(
                "page {} of the {} listing is empty but claims more data",
                page, kind
            )));
        }

        trace!(page, item_count = decoded.items.len(), has_more, "Fetched page");
        items.extend(decoded.items);

        if !has_more {
            break;
        }
        page += 1;
    }

    Span::current().record(logging::ITEM_COUNT, items.len() as u64);
    Ok(items)
}
