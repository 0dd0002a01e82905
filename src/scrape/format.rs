// src/scrape/format.rs
// =============================================================================
// Ebook formats and how to recognize them from a filename.
//
// Standard Ebooks publishes every book in four flavours:
//   jane-austen_emma.epub            -> plain epub
//   jane-austen_emma.kepub.epub      -> Kobo epub
//   jane-austen_emma.azw3            -> Kindle
//   jane-austen_emma_advanced.epub   -> advanced epub
//
// Three of the four end in ".epub", so the order of the checks matters:
// the specific suffixes are tested first and the plain rule excludes them.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::ScrapeError;

const AZW3_SUFFIX: &str = ".azw3";
const ADVANCED_SUFFIX: &str = "_advanced.epub";
const KEPUB_SUFFIX: &str = ".kepub.epub";
const EPUB_SUFFIX: &str = ".epub";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Standard reflowable epub
    Epub,
    /// Kobo flavoured epub
    Kepub,
    /// Kindle
    Azw3,
    /// Epub using newer reader features
    AdvancedEpub,
}

impl Format {
    pub const ALL: [Format; 4] = [
        Format::Epub,
        Format::Kepub,
        Format::Azw3,
        Format::AdvancedEpub,
    ];

    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Format::Epub => "epub",
            Format::Kepub => "kepub",
            Format::Azw3 => "azw3",
            Format::AdvancedEpub => "advanced-epub",
        }
    }

    /// Works out which format a bare filename is, if any.
    pub fn classify(filename: &str) -> Option<Format> {
        if filename.ends_with(AZW3_SUFFIX) {
            Some(Format::Azw3)
        } else if filename.ends_with(ADVANCED_SUFFIX) {
            Some(Format::AdvancedEpub)
        } else if filename.ends_with(KEPUB_SUFFIX) {
            Some(Format::Kepub)
        } else if filename.ends_with(EPUB_SUFFIX) {
            Some(Format::Epub)
        } else {
            None
        }
    }

    /// Default value for --formats: every format we know
    pub fn all_names() -> String {
        Format::ALL
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| ScrapeError::UnsupportedFormat { token: s.to_string() })
    }
}

// The set of formats the user asked for
#[derive(Debug, Clone)]
pub struct FormatMatcher {
    active: Vec<Format>,
}

impl FormatMatcher {
    /// Builds a matcher from a comma-separated list like "epub,azw3".
    pub fn new(list: &str) -> Result<Self, ScrapeError> {
        let mut active = Vec::new();
        for token in list.split(',') {
            let format: Format = token.trim().parse()?;
            if !active.contains(&format) {
                active.push(format);
            }
        }
        Ok(Self { active })
    }

    /// The format of `filename` when that format is active.
    pub fn matching(&self, filename: &str) -> Option<Format> {
        Format::classify(filename).filter(|f| self.active.contains(f))
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.matching(filename).is_some()
    }
}
