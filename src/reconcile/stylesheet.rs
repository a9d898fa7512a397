//! Stylesheet cache-busting.
//!
//! Rewrites each stylesheet href with a `_t=<stamp>` query parameter so the
//! browser refetches it even when the path is unchanged.

use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

/// Query parameter carrying the cache-busting stamp.
pub const CACHE_BUST_PARAM: &str = "_t";

/// Source of cache-busting stamps.
///
/// Stamps are Unix milliseconds, but strictly increasing: two calls within
/// the same millisecond (or across a clock step backwards) still differ.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: u64,
}

impl CacheBuster {
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    pub fn next_stamp(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.last = now.max(self.last + 1);
        self.last
    }
}

/// Resolve `href` against `base` and set the cache-busting parameter.
///
/// An existing `_t` is replaced; other query pairs are kept in order.
pub fn bust_href(base: &Url, href: &str, stamp: u64) -> Result<String, url::ParseError> {
    let mut url = base.join(href)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != CACHE_BUST_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(CACHE_BUST_PARAM, &stamp.to_string());

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:3000/docs/intro").unwrap()
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let mut buster = CacheBuster::new();
        let stamps: Vec<u64> = (0..100).map(|_| buster.next_stamp()).collect();
        assert!(stamps.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_bust_absolute_path() {
        let href = bust_href(&base(), "/static/app.css", 42).unwrap();
        assert_eq!(href, "http://localhost:3000/static/app.css?_t=42");
    }

    #[test]
    fn test_bust_relative_path_resolves_against_page() {
        let href = bust_href(&base(), "theme.css", 7).unwrap();
        assert_eq!(href, "http://localhost:3000/docs/theme.css?_t=7");
    }

    #[test]
    fn test_bust_replaces_previous_stamp() {
        let first = bust_href(&base(), "/app.css?v=2", 1).unwrap();
        assert_eq!(first, "http://localhost:3000/app.css?v=2&_t=1");

        let second = bust_href(&base(), &first, 2).unwrap();
        assert_eq!(second, "http://localhost:3000/app.css?v=2&_t=2");
    }

    #[test]
    fn test_bust_changes_href_within_same_millisecond() {
        let mut buster = CacheBuster::new();
        let once = bust_href(&base(), "/app.css", buster.next_stamp()).unwrap();
        let twice = bust_href(&base(), &once, buster.next_stamp()).unwrap();
        assert_ne!(once, twice);
    }
}
