// src/scrape/parsers.rs
// =============================================================================
// Link extraction for the three kinds of pages.
//
// - EbookPageParser: the download links of one book, filtered by format
// - CollectionPageParser: the book pages listed in a collection
// - AuthorPageParser: the book pages listed for an author
//
// All three walk the document depth-first and collect matching anchors in
// document order. A matching href that isn't a valid URL aborts the parse.
// Hrefs are resolved against the site root, so every returned link is
// absolute.
// =============================================================================

use scraper::Html;
use url::Url;

use super::format::FormatMatcher;
use super::site::PageKind;
use super::tree::{walk_preorder, TreeNode};
use crate::error::ScrapeError;

pub trait PageParser {
    /// Kind of page this parser understands
    fn kind(&self) -> PageKind;

    /// Extracts links from a parsed page. No network access.
    fn parse(&self, document: &Html, base: &Url) -> Result<Vec<Url>, ScrapeError>;

    fn parse_str(&self, html: &str, base: &Url) -> Result<Vec<Url>, ScrapeError> {
        self.parse(&Html::parse_document(html), base)
    }
}

// Walks the tree and resolves the href of every anchor `wants` accepts
fn collect_links<N, P>(root: N, base: &Url, wants: P) -> Result<Vec<Url>, ScrapeError>
where
    N: TreeNode,
    P: Fn(&N, &str) -> bool,
{
    let mut links = Vec::new();

    walk_preorder(root, |node| {
        if !node.is("a") {
            return Ok(());
        }
        if let Some(href) = node.attribute("href") {
            if wants(node, href) {
                match base.join(href) {
                    Ok(link) => links.push(link),
                    Err(source) => {
                        return Err(ScrapeError::InvalidHref {
                            href: href.to_string(),
                            source,
                        })
                    }
                }
            }
        }
        Ok(())
    })?;

    Ok(links)
}

// Last path segment of an href, without query or fragment
//
// "/ebooks/a/b/downloads/a_b.epub?source=download" -> "a_b.epub"
fn href_filename(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.rsplit('/').next().unwrap_or(path)
}

// A book link on listing pages sits in <li><p><a>, with a bare <p>
//
// Other anchors in list items (author names, tags...) live in paragraphs
// that carry a class.
fn is_listed_book_link<N: TreeNode>(anchor: &N) -> bool {
    let Some(paragraph) = anchor.parent_node() else {
        return false;
    };
    if !paragraph.is("p") || paragraph.attribute_count() != 0 {
        return false;
    }
    paragraph
        .parent_node()
        .map(|item| item.is("li"))
        .unwrap_or(false)
}

/// Parses the page of an individual ebook.
#[derive(Debug, Clone)]
pub struct EbookPageParser {
    formats: FormatMatcher,
}

impl EbookPageParser {
    pub fn new(formats: FormatMatcher) -> Self {
        Self { formats }
    }
}

impl PageParser for EbookPageParser {
    fn kind(&self) -> PageKind {
        PageKind::Ebook
    }

    fn parse(&self, document: &Html, base: &Url) -> Result<Vec<Url>, ScrapeError> {
        collect_links(document.root_element(), base, |_, href| {
            self.formats.matches(href_filename(href))
        })
    }
}

/// Parses the page of an entire collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionPageParser;

impl CollectionPageParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for CollectionPageParser {
    fn kind(&self) -> PageKind {
        PageKind::Collection
    }

    fn parse(&self, document: &Html, base: &Url) -> Result<Vec<Url>, ScrapeError> {
        collect_links(document.root_element(), base, |anchor, _| is_listed_book_link(anchor))
    }
}

/// Parses the page of an author.
///
/// Same rule as collections for now, kept apart because the two page
/// layouts are maintained separately on the site.
#[derive(Debug, Clone, Default)]
pub struct AuthorPageParser;

impl AuthorPageParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for AuthorPageParser {
    fn kind(&self) -> PageKind {
        PageKind::Author
    }

    fn parse(&self, document: &Html, base: &Url) -> Result<Vec<Url>, ScrapeError> {
        collect_links(document.root_element(), base, |anchor, _| is_listed_book_link(anchor))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why generic over N: TreeNode?
//    - collect_links and is_listed_book_link only use the trait methods
//    - They would work unchanged on another HTML library's tree
//
// 2. What is `let ... else`?
//    - Binds a pattern or runs the else block, which must leave the function
//    - let Some(paragraph) = anchor.parent_node() else { return false; };
//
// 3. Why does url.join() validate the href?
//    - join parses the href relative to the base, like a browser would
//    - A broken href ("http://[oops") fails to parse and we stop there
// -----------------------------------------------------------------------------
