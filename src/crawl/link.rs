// src/crawl/link.rs
// A listing link is the detail endpoint base with the listing token appended.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingLink {
    pub token: String,
    pub url: String,
}

impl ListingLink {
    pub fn new(detail_base: &str, token: &str) -> Self {
        let url = if detail_base.ends_with('/') {
            format!("{}{}", detail_base, token)
        } else {
            format!("{}/{}", detail_base, token)
        };
        Self {
            token: token.to_string(),
            url,
        }
    }
}

/// Returns the last non-empty path segment of a link, if it has one.
///
/// "https://api.example.com/v8/posts-v2/web/abc123" -> Some("abc123")
pub fn token_from_url(link: &str) -> Option<String> {
    let parsed = Url::parse(link).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
