// src/error.rs
// =============================================================================
// Error types for the scraping core.
//
// Every failure in the pipeline is fatal: the first error aborts the whole
// run and travels back to main.rs, which prints it and exits non-zero.
// Because of that, each variant carries enough context (which URL, and
// whether it was an input page or a book page found on another page) to
// make the message useful on its own.
// =============================================================================

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

// Which role a fetched page played in the crawl
//
// Input pages are the URLs the user gave us. Book pages are the pages we
// discovered on an author or collection page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRole {
    Input,
    BookPage { parent: String, parent_kind: &'static str },
}

impl fmt::Display for PageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRole::Input => write!(f, "input page"),
            PageRole::BookPage { parent, parent_kind } => {
                write!(f, "book page from {}: {}", parent_kind, parent)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A format name in --formats that we don't know about
    #[error("the format \"{token}\" is not supported")]
    UnsupportedFormat { token: String },

    /// An href that is not a valid URL
    #[error("while processing {href}: {source}")]
    InvalidHref {
        href: String,
        #[source]
        source: url::ParseError,
    },

    /// The input URL does not belong to the site at all
    #[error("{url} is not a valid Standard Ebooks page")]
    NotThisSite { url: String },

    /// The input URL is on the site but is not a book, author or collection page
    #[error("{url} was not recognized as a valid URL format")]
    UnrecognizedPage { url: String },

    /// Transport-level failure (DNS, connection reset, body read...)
    #[error("while getting {url} ({role}): {source}")]
    Fetch {
        url: String,
        role: PageRole,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with 2xx
    #[error("while getting {url} ({role}): HTTP {status}")]
    HttpStatus {
        url: String,
        role: PageRole,
        status: StatusCode,
    },

    /// A page was fetched but its links could not be extracted
    #[error("while parsing {url} ({role}): {source}")]
    Parse {
        url: String,
        role: PageRole,
        #[source]
        source: Box<ScrapeError>,
    },

    /// The configured site origin is unusable
    #[error("invalid site origin '{origin}': {reason}")]
    InvalidSite { origin: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_names_token() {
        let err = ScrapeError::UnsupportedFormat { token: "mobi".to_string() };
        assert_eq!(err.to_string(), "the format \"mobi\" is not supported");
    }

    #[test]
    fn test_parse_error_mentions_parent_page() {
        let inner = ScrapeError::InvalidHref {
            href: "http://[oops".to_string(),
            source: url::ParseError::InvalidIpv6Address,
        };
        let err = ScrapeError::Parse {
            url: "https://standardebooks.org/ebooks/a/b".to_string(),
            role: PageRole::BookPage {
                parent: "https://standardebooks.org/ebooks/a".to_string(),
                parent_kind: "author",
            },
            source: Box::new(inner),
        };

        let message = err.to_string();
        assert!(message.contains("ebooks/a/b"));
        assert!(message.contains("author: https://standardebooks.org/ebooks/a"));
        assert!(message.contains("http://[oops"));
    }
}
