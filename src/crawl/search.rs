// src/crawl/search.rs
// =============================================================================
// This module pages through the search endpoint and turns listing stubs into
// detail links.
//
// How it works:
// 1. POST the static filter payload plus the current cursor's pagination
// 2. Append the page's `list_widgets` stubs to an accumulator
// 3. Build the next cursor from the response's `pagination.data`
// 4. Sleep a random politeness delay
// 5. Stop once more than `target` stubs have been collected (the last page
//    may overshoot) or the API returns an empty page
// 6. Walk each stub to `data.action.payload.token`; stubs without one are
//    skipped and counted, duplicates are dropped
//
// Any transport failure ends the crawl. There is no retry.
// =============================================================================

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::cursor::{PaginationData, SearchCursor};
use super::link::ListingLink;
use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::politeness::Politeness;

/// The static part of every search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub city_ids: Vec<String>,
    pub category: String,
    pub sort: String,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            city_ids: vec!["1".to_string()],
            category: "residential-sell".to_string(),
            sort: "sort_date".to_string(),
        }
    }
}

impl SearchFilter {
    /// Renders the request body for one search page.
    pub fn payload(&self, cursor: &SearchCursor) -> Value {
        let mut body = json!({
            "city_ids": self.city_ids,
            "source_view": "CATEGORY",
            "disable_recommendation": false,
            "map_state": {
                "camera_info": { "bbox": {} },
                "page_state": "HALF_STATE"
            },
            "search_data": {
                "form_data": {
                    "data": { "category": { "str": { "value": self.category } } }
                },
                "server_payload": {
                    "@type": "type.googleapis.com/widgets.SearchData.ServerPayload",
                    "additional_form_data": {
                        "data": { "sort": { "str": { "value": self.sort } } }
                    }
                }
            }
        });

        if let (Some(block), Some(object)) = (cursor.pagination(), body.as_object_mut()) {
            // PaginationBlock only holds plain values, serializing it cannot fail
            if let Ok(block) = serde_json::to_value(block) {
                object.insert("pagination_data".to_string(), block);
            }
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    list_widgets: Vec<Value>,
    pagination: PaginationEnvelope,
}

#[derive(Debug, Deserialize)]
struct PaginationEnvelope {
    data: PaginationData,
}

/// What a finished crawl produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOutcome {
    /// Unique links, in the order they were first seen
    pub links: Vec<ListingLink>,
    pub pages: usize,
    pub stubs_seen: usize,
    /// Stubs without a token
    pub skipped: usize,
    pub duplicates: usize,
}

pub struct SearchCrawler {
    client: Client,
    search_url: String,
    detail_url: String,
    filter: SearchFilter,
    page_increment: u32,
    politeness: Politeness,
}

impl SearchCrawler {
    pub fn new(client: Client, config: &HarvestConfig) -> Self {
        Self {
            client,
            search_url: config.search_url.clone(),
            detail_url: config.detail_url.clone(),
            filter: config.filter.clone(),
            page_increment: config.page_increment,
            politeness: config.politeness,
        }
    }

    /// Crawls until more than `target` stubs have been collected.
    pub async fn run(&self, start: SearchCursor, target: usize) -> Result<CrawlOutcome> {
        let mut cursor = start;
        let mut stubs: Vec<Value> = Vec::new();
        let mut pages = 0;

        info!(target, "crawling search results");

        loop {
            debug!(
                page = cursor.page_index(),
                cumulative = cursor.cumulative_count(),
                "requesting search page"
            );

            let response = self.fetch_page(&cursor).await?;
            self.politeness.pause().await;
            pages += 1;

            let page_len = response.list_widgets.len();
            stubs.extend(response.list_widgets);
            cursor = cursor.next(&response.pagination.data, self.page_increment);

            info!(page = pages, stubs = stubs.len(), "fetched search page");

            if page_len == 0 {
                info!("search returned an empty page, stopping");
                break;
            }
            if stubs.len() > target {
                break;
            }
        }

        let (links, skipped, duplicates) = derive_links(&stubs, &self.detail_url);
        if skipped > 0 {
            warn!(skipped, "listing stubs without a token were skipped");
        }

        Ok(CrawlOutcome {
            links,
            pages,
            stubs_seen: stubs.len(),
            skipped,
            duplicates,
        })
    }

    async fn fetch_page(&self, cursor: &SearchCursor) -> Result<SearchResponse> {
        let url = &self.search_url;
        let response = self
            .client
            .post(url)
            .json(&self.filter.payload(cursor))
            .send()
            .await
            .map_err(|source| HarvestError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(HarvestError::Status {
                url: url.clone(),
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(|source| HarvestError::Request {
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| HarvestError::Decode {
            url: url.clone(),
            source,
        })
    }
}

/// Turns raw listing stubs into unique detail links.
///
/// Returns `(links, skipped, duplicates)`: stubs with no token at
/// `data.action.payload.token` are skipped, repeated tokens are dropped.
pub fn derive_links(stubs: &[Value], detail_base: &str) -> (Vec<ListingLink>, usize, usize) {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut skipped = 0;
    let mut duplicates = 0;

    for stub in stubs {
        let token = stub
            .pointer("/data/action/payload/token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty());

        match token {
            Some(token) if seen.insert(token.to_string()) => {
                links.push(ListingLink::new(detail_base, token));
            }
            Some(_) => duplicates += 1,
            None => {
                debug!("listing stub has no token");
                skipped += 1;
            }
        }
    }

    (links, skipped, duplicates)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is `cursor` reassigned instead of mutated?
//    - `cursor.next(..)` returns a brand new SearchCursor
//    - The old one is dropped when we overwrite the variable
//    - The update rule is a plain function, so it is tested on its own
//      (see src/crawl/cursor.rs) without any HTTP involved
//
// 2. What does `.pointer("/data/action/payload/token")` do?
//    - It walks a serde_json::Value with a JSON Pointer (RFC 6901)
//    - Returns None as soon as any step is missing, no panics
//    - Much tidier than chaining .get("data").and_then(|d| d.get("action"))...
//
// 3. Why `seen.insert(..)` inside the match guard?
//    - HashSet::insert returns false when the value was already present
//    - So the first arm only matches tokens we have not seen yet
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn stub(token: &str) -> Value {
        json!({
            "widget_type": "POST_ROW",
            "data": { "action": { "type": "VIEW_POST", "payload": { "token": token } } }
        })
    }

    fn page_body(tokens: &[&str]) -> String {
        let widgets: Vec<Value> = tokens.iter().map(|t| stub(t)).collect();
        json!({
            "list_widgets": widgets,
            "pagination": {
                "has_next_page": true,
                "data": {
                    "@type": "type.googleapis.com/post_list.PaginationData",
                    "last_post_date": 1_700_000_000_000u64,
                    "search_uid": "uid-1",
                    "viewed_tokens": "H4sIAAAA"
                }
            }
        })
        .to_string()
    }

    fn test_config(server: &Server) -> HarvestConfig {
        HarvestConfig {
            search_url: format!("{}/search", server.url()),
            detail_url: format!("{}/detail/", server.url()),
            politeness: Politeness::disabled(),
            ..HarvestConfig::default()
        }
    }

    #[test]
    fn test_first_payload_has_no_pagination() {
        let body = SearchFilter::default().payload(&SearchCursor::start(1, 26));
        assert_eq!(body["city_ids"], json!(["1"]));
        assert_eq!(
            body["search_data"]["form_data"]["data"]["category"]["str"]["value"],
            json!("residential-sell")
        );
        assert!(body.get("pagination_data").is_none());
    }

    #[test]
    fn test_later_payload_carries_cursor() {
        let data = PaginationData {
            last_post_date: json!(42),
            search_uid: json!("uid"),
            viewed_tokens: json!("seen"),
        };
        let cursor = SearchCursor::start(1, 26).next(&data, 24);
        let body = SearchFilter::default().payload(&cursor);

        let pagination = &body["pagination_data"];
        assert_eq!(pagination["last_post_date"], json!(42));
        assert_eq!(pagination["page"], json!(1));
        assert_eq!(pagination["layer_page"], json!(1));
        assert_eq!(pagination["search_uid"], json!("uid"));
        assert_eq!(pagination["cumulative_widgets_count"], json!(26));
        assert_eq!(pagination["viewed_tokens"], json!("seen"));
    }

    #[test]
    fn test_derive_links_skips_and_dedups() {
        let stubs = vec![
            stub("aaa"),
            json!({ "data": { "title": "advert without action" } }),
            stub("bbb"),
            stub("aaa"),
            stub(""),
        ];
        let (links, skipped, duplicates) = derive_links(&stubs, "https://x/web/");

        let tokens: Vec<_> = links.iter().map(|l| l.token.as_str()).collect();
        assert_eq!(tokens, vec!["aaa", "bbb"]);
        assert_eq!(links[1].url, "https://x/web/bbb");
        assert_eq!(skipped, 2);
        assert_eq!(duplicates, 1);
        assert_eq!(links.len() + skipped + duplicates, stubs.len());
    }

    #[tokio::test]
    async fn test_run_stops_after_exceeding_target() {
        let mut server = Server::new_async().await;
        let config = test_config(&server);

        // The API keeps returning the same three listings, so later pages only
        // add duplicates. Each request is matched by its own body: the first
        // one exactly (no pagination_data at all), the later ones by the
        // cursor they must carry.
        let first = server
            .mock("POST", "/search")
            .match_body(Matcher::Json(
                config.filter.payload(&SearchCursor::start(1, 26)),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page_body(&["t1", "t2", "t3"]))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/search")
            .match_body(Matcher::PartialJson(json!({
                "pagination_data": {
                    "page": 1,
                    "cumulative_widgets_count": 26,
                    "search_uid": "uid-1"
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page_body(&["t1", "t2", "t3"]))
            .expect(1)
            .create_async()
            .await;
        let third = server
            .mock("POST", "/search")
            .match_body(Matcher::PartialJson(json!({
                "pagination_data": {
                    "page": 2,
                    "cumulative_widgets_count": 50,
                    "search_uid": "uid-1",
                    "viewed_tokens": "H4sIAAAA"
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(page_body(&["t1", "t2", "t3"]))
            .expect(1)
            .create_async()
            .await;

        let crawler = SearchCrawler::new(Client::new(), &config);
        // 3 and 6 stubs are not more than 7, 9 is
        let outcome = crawler.run(SearchCursor::start(1, 26), 7).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.stubs_seen, 9);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.duplicates, 6);

        let tokens: Vec<_> = outcome.links.iter().map(|l| l.token.as_str()).collect();
        assert_eq!(tokens, vec!["t1", "t2", "t3"]);
        assert_eq!(outcome.links[0].url, format!("{}/detail/t1", server.url()));
    }

    #[tokio::test]
    async fn test_run_stops_on_empty_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body(page_body(&[]))
            .expect(1)
            .create_async()
            .await;

        let config = test_config(&server);
        let crawler = SearchCrawler::new(Client::new(), &config);
        let outcome = crawler.run(SearchCursor::start(1, 26), 1000).await.unwrap();

        mock.assert_async().await;
        assert_eq!(outcome.pages, 1);
        assert!(outcome.links.is_empty());
    }

    #[tokio::test]
    async fn test_run_fails_on_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(403)
            .with_body("blocked")
            .create_async()
            .await;

        let config = test_config(&server);
        let crawler = SearchCrawler::new(Client::new(), &config);
        let err = crawler.run(SearchCursor::start(1, 26), 10).await.unwrap_err();

        assert!(err.is_transport());
        assert!(matches!(err, HarvestError::Status { status, .. } if status.as_u16() == 403));
    }

    #[tokio::test]
    async fn test_run_fails_on_malformed_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/search")
            .with_status(200)
            .with_body("<html>captcha</html>")
            .create_async()
            .await;

        let config = test_config(&server);
        let crawler = SearchCrawler::new(Client::new(), &config);
        let err = crawler.run(SearchCursor::start(1, 26), 10).await.unwrap_err();

        assert!(matches!(err, HarvestError::Decode { .. }));
    }
}
