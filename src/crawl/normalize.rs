// src/crawl/normalize.rs
// =============================================================================
// Turns the URLs the user typed into the set of ebook files to download.
//
// How it works:
// 1. Drop repeated input URLs
// 2. Classify each input as an ebook, author or collection page
// 3. Ebook page: fetch it, its download links are the files
// 4. Author/collection page: fetch it, then fetch every book page it lists
//    and collect the download links of each one
// 5. Everything lands in a UrlSet, so a file reachable twice is kept once
//
// The first error stops everything; there is no "skip and continue".
// =============================================================================

use std::collections::{HashMap, HashSet};

use url::Url;

use super::client::PoliteClient;
use crate::error::{PageRole, ScrapeError};
use crate::scrape::{
    AuthorPageParser, CollectionPageParser, EbookPageParser, FormatMatcher, PageKind, PageParser,
    Site,
};

// A set of URLs without repeats, keyed by their serialized form
#[derive(Debug, Clone, Default)]
pub struct UrlSet {
    set: HashMap<String, Url>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = Url>,
    {
        for url in urls {
            if !self.contains(&url) {
                self.set.insert(url.as_str().to_string(), url);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.set.contains_key(url.as_str())
    }

    /// All members, in no particular order
    pub fn to_vec(&self) -> Vec<Url> {
        self.set.values().cloned().collect()
    }
}

/// Removes repeated strings, keeping the first occurrence of each.
pub fn remove_string_duplicates(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for item in items {
        if seen.insert(item.as_str()) {
            unique.push(item.clone());
        }
    }

    unique
}

// The parsers for one run, built once and reused for every page
struct Parsers {
    ebook: EbookPageParser,
    author: AuthorPageParser,
    collection: CollectionPageParser,
}

impl Parsers {
    fn for_kind(&self, kind: PageKind) -> Option<&dyn PageParser> {
        match kind {
            PageKind::Ebook => Some(&self.ebook),
            PageKind::Author => Some(&self.author),
            PageKind::Collection => Some(&self.collection),
            PageKind::Invalid => None,
        }
    }
}

// Fetches a page and runs a parser over it, tagging errors with the page
async fn fetch_links(
    client: &mut PoliteClient,
    parser: &dyn PageParser,
    url: &Url,
    base: &Url,
    role: &PageRole,
) -> Result<Vec<Url>, ScrapeError> {
    let html = client.fetch_page(url, role).await?;

    parser.parse_str(&html, base).map_err(|e| ScrapeError::Parse {
        url: url.to_string(),
        role: role.clone(),
        source: Box::new(e),
    })
}

// Parses an input URL, reporting a failure against the input page
fn parse_input_url(raw_url: &str) -> Result<Url, ScrapeError> {
    Url::parse(raw_url).map_err(|source| ScrapeError::Parse {
        url: raw_url.to_string(),
        role: PageRole::Input,
        source: Box::new(ScrapeError::InvalidHref {
            href: raw_url.to_string(),
            source,
        }),
    })
}

/// Resolves `raw_urls` (book, author or collection pages) into the set of
/// downloadable files in the formats listed in `formats`.
///
/// Every request goes through `client`, one at a time. All returned URLs are
/// absolute, on `site`.
pub async fn normalize_urls(
    raw_urls: &[String],
    formats: &str,
    site: &Site,
    client: &mut PoliteClient,
) -> Result<UrlSet, ScrapeError> {
    let raw_urls = remove_string_duplicates(raw_urls);

    let parsers = Parsers {
        ebook: EbookPageParser::new(FormatMatcher::new(formats)?),
        author: AuthorPageParser::new(),
        collection: CollectionPageParser::new(),
    };

    let mut files = UrlSet::new();

    for raw_url in &raw_urls {
        let kind = site.classify(raw_url)?;
        let parser = parsers.for_kind(kind).ok_or_else(|| ScrapeError::UnrecognizedPage {
            url: raw_url.clone(),
        })?;

        let page_url = parse_input_url(raw_url)?;

        let links = fetch_links(client, parser, &page_url, site.base(), &PageRole::Input).await?;

        if kind == PageKind::Ebook {
            files.add(links);
            continue;
        }

        // Author or collection: the links are book pages
        let role = PageRole::BookPage {
            parent: raw_url.clone(),
            parent_kind: parser.kind().name(),
        };
        for book_url in &links {
            let book_files =
                fetch_links(client, &parsers.ebook, book_url, site.base(), &role).await?;
            files.add(book_files);
        }
    }

    Ok(files)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the client passed as &mut?
//    - PoliteClient owns the timer, and every request moves the timer forward
//    - &mut also means nobody else can use the client at the same time,
//      which is exactly the "one connection at a time" rule
//
// 2. What is &dyn PageParser?
//    - A reference to "some type that implements PageParser"
//    - The concrete parser is picked at runtime from the page kind
//    - Lets fetch_links work with any of the three parsers
//
// 3. Why HashMap<String, Url> instead of HashSet<Url>?
//    - The key is the serialized URL, the value the parsed one
//    - Two URLs count as the same file when their text is the same
//
// 4. What does `?` do inside the loop?
//    - Returns the error from normalize_urls right away
//    - The partially filled UrlSet is dropped; callers only see the error
// -----------------------------------------------------------------------------
