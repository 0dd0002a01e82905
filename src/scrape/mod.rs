// src/scrape/mod.rs
// =============================================================================
// Everything that turns HTML and URLs into links, without touching the
// network.
//
// Submodules:
// - format: which ebook format a filename is
// - site: which kind of page a URL is
// - tree: element tree view and depth-first walk
// - parsers: link extraction for ebook, author and collection pages
// =============================================================================

mod format;
mod parsers;
mod site;
mod tree;

pub use format::{Format, FormatMatcher};
pub use parsers::{AuthorPageParser, CollectionPageParser, EbookPageParser, PageParser};
pub use site::{PageKind, Site, DEFAULT_SITE};
