// src/scrape/site.rs
// =============================================================================
// Knows the shape of the site's URLs and tells which kind of page an input
// URL points to. Pure string matching, no network access.
//
//   <origin>/ebooks/<author>/<book...>   -> Ebook
//   <origin>/ebooks/<author>[/]          -> Author
//   <origin>/collections/<name...>       -> Collection
//
// Every book URL also starts like an author URL, so Ebook is tested first.
// =============================================================================

use std::fmt;

use regex::Regex;
use url::Url;

use crate::error::ScrapeError;

pub const DEFAULT_SITE: &str = "https://standardebooks.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Ebook,
    Author,
    Collection,
    Invalid,
}

impl PageKind {
    pub fn name(self) -> &'static str {
        match self {
            PageKind::Ebook => "ebook",
            PageKind::Author => "author",
            PageKind::Collection => "collection",
            PageKind::Invalid => "invalid",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct Site {
    base: Url,
    main: Regex,
    ebook: Regex,
    author: Regex,
    collection: Regex,
}

impl Site {
    /// Builds the URL patterns for a site origin such as "https://standardebooks.org".
    ///
    /// Only the origin of `origin` is kept; any path is dropped, because all
    /// links on the site are resolved against its root.
    pub fn new(origin: &str) -> Result<Self, ScrapeError> {
        let invalid = |reason: String| ScrapeError::InvalidSite {
            origin: origin.to_string(),
            reason,
        };

        let parsed = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(invalid("expected an http(s) origin".to_string()));
        }

        let prefix = parsed.origin().ascii_serialization();
        let base = Url::parse(&prefix).map_err(|e| invalid(e.to_string()))?;
        let escaped = regex::escape(&prefix);

        let pattern = |shape: &str| {
            Regex::new(&format!("^{}{}$", escaped, shape)).map_err(|e| invalid(e.to_string()))
        };

        Ok(Self {
            main: pattern("/.*")?,
            ebook: pattern(r"/ebooks/[A-Za-z\-]+/.*")?,
            author: pattern(r"/ebooks/[A-Za-z\-]+/?")?,
            collection: pattern("/collections/.*")?,
            base,
        })
    }

    /// The site root, used to resolve relative links
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Which kind of page `raw_url` is.
    ///
    /// A URL from another site is an error. A URL on the site with an unknown
    /// shape is `PageKind::Invalid`; no parser handles it.
    pub fn classify(&self, raw_url: &str) -> Result<PageKind, ScrapeError> {
        if !self.main.is_match(raw_url) {
            return Err(ScrapeError::NotThisSite {
                url: raw_url.to_string(),
            });
        }

        let kind = if self.ebook.is_match(raw_url) {
            PageKind::Ebook
        } else if self.author.is_match(raw_url) {
            PageKind::Author
        } else if self.collection.is_match(raw_url) {
            PageKind::Collection
        } else {
            PageKind::Invalid
        };
        Ok(kind)
    }
}
