// src/api/pagination.rs
//! Sequential cursor walk over a paginated list endpoint.

use crate::error::{NotionError, Result};
use crate::model::PaginatedResponse;

/// Fetches every page of a list, one request at a time, in arrival order.
///
/// `fetch_page` receives the cursor of the page to request (`None` for the
/// first). Any failed page aborts the whole walk, discarding what was
/// already accumulated.
pub fn fetch_all_pages<T, F>(operation: &'static str, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<PaginatedResponse<T>>,
{
    let mut all_items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_page(cursor.as_deref())?;
        pages_fetched += 1;

        log::debug!(
            "{}: page {} returned {} items (has_more: {})",
            operation,
            pages_fetched,
            response.results.len(),
            response.has_more
        );

        all_items.extend(response.results);

        if !response.has_more {
            break;
        }

        let next = match response.next_cursor {
            Some(next) if !next.is_empty() => next,
            _ => {
                return Err(NotionError::Pagination {
                    operation,
                    reason: "has_more is set but next_cursor is missing".to_string(),
                })
            }
        };
        if cursor.as_deref() == Some(next.as_str()) {
            return Err(NotionError::Pagination {
                operation,
                reason: format!("cursor {} did not advance", next),
            });
        }
        cursor = Some(next);
    }

    Ok(all_items)
}
