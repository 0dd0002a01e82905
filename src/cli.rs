// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::scrape::{Format, DEFAULT_SITE};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "se-scraper",
    version = "0.1.0",
    about = "Scrape ebook files from Standard Ebooks",
    long_about = "se-scraper takes Standard Ebooks book, author or collection pages and downloads \
                  the ebook files they lead to. All connections are made one at a time, with a \
                  pause between them, to be gentle with the Standard Ebooks servers."
)]
pub struct Cli {
    /// Book, author or collection pages to process
    ///
    /// e.g. https://standardebooks.org/ebooks/jane-austen
    pub urls: Vec<String>,

    /// File with more links to process, one per line
    #[arg(long = "in", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Formats to download, separated by commas
    ///
    /// Supported: epub, kepub, azw3, advanced-epub
    #[arg(long, value_name = "EXTENSIONS", default_value_t = Format::all_names())]
    pub formats: String,

    /// Base directory for the downloads; created if necessary
    #[arg(long, value_name = "DIRECTORY", default_value = ".")]
    pub dir: PathBuf,

    /// Seconds to wait between *every* HTTP connection, page fetches included
    ///
    /// Can be set to 0, but let's try to be nice to the Standard Ebooks servers.
    #[arg(long, value_name = "SECONDS", default_value_t = 1)]
    pub connection_wait: u64,

    /// Save kepub files as ".kepub" instead of ".kepub.epub"
    #[arg(long)]
    pub trim_kepub: bool,

    /// Site origin to scrape
    #[arg(long, value_name = "ORIGIN", default_value = DEFAULT_SITE)]
    pub site: String,

    /// Only list the files that would be downloaded
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the list as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log level used when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
