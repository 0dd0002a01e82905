// src/crawl/mod.rs
// =============================================================================
// This module handles talking to the site.
//
// Features:
// - One request at a time, with a fixed pause after each body is read
// - Expansion of author and collection pages into their books' files
// - A deduplicated set of file URLs as the result
//
// Rust concepts:
// - Async programming: requests are awaited one after another
// - Collections: HashMap for the URL set, HashSet for input deduplication
// =============================================================================

mod client;
mod normalize;
mod timer;

pub use client::PoliteClient;
pub use normalize::{normalize_urls, UrlSet};
