// src/crawl/cursor.rs
// =============================================================================
// Pagination state for the search endpoint.
//
// The API pages by echoing back what it told us last time: the date of the
// last post, a search id and the tokens we have already been shown. Those
// come from each response's `pagination.data` block and are sent back with
// the page number and cumulative widget count in the next request.
//
// A SearchCursor is never mutated. `next()` takes the current cursor and a
// response's pagination data and returns the cursor for the next request.
// =============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

const PAGINATION_TYPE: &str = "type.googleapis.com/post_list.PaginationData";

/// The `pagination.data` block of a search response. All fields are opaque.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaginationData {
    #[serde(default)]
    pub last_post_date: Value,
    #[serde(default)]
    pub search_uid: Value,
    #[serde(default)]
    pub viewed_tokens: Value,
}

/// The `pagination_data` object sent with every request after the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationBlock {
    #[serde(rename = "@type")]
    pub type_url: &'static str,
    pub last_post_date: Value,
    pub page: u32,
    pub layer_page: u32,
    pub search_uid: Value,
    pub cumulative_widgets_count: u32,
    pub viewed_tokens: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCursor {
    page_index: u32,
    cumulative_count: u32,
    pagination: Option<PaginationBlock>,
}

impl SearchCursor {
    /// The cursor for the very first request, which carries no pagination.
    pub fn start(page_index: u32, cumulative_count: u32) -> Self {
        Self {
            page_index,
            cumulative_count,
            pagination: None,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn cumulative_count(&self) -> u32 {
        self.cumulative_count
    }

    /// What the next request reports back to the API, if anything.
    pub fn pagination(&self) -> Option<&PaginationBlock> {
        self.pagination.as_ref()
    }

    pub fn last_post_date(&self) -> Option<&Value> {
        self.pagination.as_ref().map(|p| &p.last_post_date)
    }

    pub fn search_uid(&self) -> Option<&Value> {
        self.pagination.as_ref().map(|p| &p.search_uid)
    }

    pub fn viewed_tokens(&self) -> Option<&Value> {
        self.pagination.as_ref().map(|p| &p.viewed_tokens)
    }

    /// Builds the cursor that follows a response.
    ///
    /// The pagination block reports this cursor's page and count alongside
    /// the response's tokens; the returned cursor's own page advances by one
    /// and its count by `increment`.
    pub fn next(&self, data: &PaginationData, increment: u32) -> SearchCursor {
        SearchCursor {
            page_index: self.page_index.saturating_add(1),
            cumulative_count: self.cumulative_count.saturating_add(increment),
            pagination: Some(PaginationBlock {
                type_url: PAGINATION_TYPE,
                last_post_date: data.last_post_date.clone(),
                page: self.page_index,
                layer_page: self.page_index,
                search_uid: data.search_uid.clone(),
                cumulative_widgets_count: self.cumulative_count,
                viewed_tokens: data.viewed_tokens.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(n: u64) -> PaginationData {
        PaginationData {
            last_post_date: json!(1_700_000_000_000u64 - n),
            search_uid: json!(format!("uid-{}", n)),
            viewed_tokens: json!(format!("viewed-{}", n)),
        }
    }

    #[test]
    fn test_start_has_no_pagination() {
        let cursor = SearchCursor::start(1, 26);
        assert_eq!(cursor.page_index(), 1);
        assert_eq!(cursor.cumulative_count(), 26);
        assert!(cursor.pagination().is_none());
        assert!(cursor.last_post_date().is_none());
    }

    #[test]
    fn test_next_reports_previous_counters() {
        let first = SearchCursor::start(1, 26);
        let second = first.next(&data(1), 24);

        let block = second.pagination().unwrap();
        assert_eq!(block.page, 1);
        assert_eq!(block.layer_page, 1);
        assert_eq!(block.cumulative_widgets_count, 26);
        assert_eq!(second.search_uid(), Some(&json!("uid-1")));
        assert_eq!(second.viewed_tokens(), Some(&json!("viewed-1")));

        assert_eq!(second.page_index(), 2);
        assert_eq!(second.cumulative_count(), 50);
        // The old cursor is untouched
        assert_eq!(first, SearchCursor::start(1, 26));
    }

    #[test]
    fn test_cursor_is_monotonic() {
        let mut cursor = SearchCursor::start(1, 26);
        for n in 1..=20 {
            let next = cursor.next(&data(n), 24);
            assert_eq!(next.page_index(), cursor.page_index() + 1);
            assert_eq!(next.cumulative_count(), cursor.cumulative_count() + 24);
            assert_eq!(next.last_post_date(), Some(&data(n).last_post_date));
            cursor = next;
        }
        assert_eq!(cursor.page_index(), 21);
        assert_eq!(cursor.cumulative_count(), 26 + 20 * 24);
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let cursor = SearchCursor::start(3, 74).next(&data(3), 24);
        let value = serde_json::to_value(cursor.pagination().unwrap()).unwrap();
        assert_eq!(value["@type"], json!(PAGINATION_TYPE));
        assert_eq!(value["page"], json!(3));
        assert_eq!(value["cumulative_widgets_count"], json!(74));
    }
}
