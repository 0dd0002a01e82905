// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Gather the URLs (arguments + --in file)
// 3. Resolve them into ebook file URLs (crawl::normalize_urls)
// 4. Download the files, or print them with --dry-run
// 5. Exit with proper code (0 = success, 1 = failure, 2 = usage error)
// =============================================================================

mod cli;        // src/cli.rs - command-line parsing
mod crawl;      // src/crawl/ - rate-limited fetching and page expansion
mod download;   // src/download/ - saving files to disk
mod error;      // src/error.rs - scraping errors
mod input;      // src/input.rs - URL list gathering
mod scrape;     // src/scrape/ - URL classification and link extraction

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use reqwest::Client;
use tracing::{debug, info};

use cli::Cli;
use crawl::PoliteClient;
use scrape::Site;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = everything downloaded (or listed)
//   Ok(2) = usage error
//   Err = any failure while crawling or downloading
async fn run(cli: Cli) -> Result<i32> {
    debug!(?cli, "arguments parsed");

    let urls = input::collect_urls(&cli.urls, cli.input.as_deref()).await?;

    // No URLs at all is the same as asking for help
    if urls.is_empty() {
        Cli::command().print_help()?;
        return Ok(0);
    }

    if cli.dir.as_os_str().is_empty() {
        eprintln!("error: base directory can't be empty");
        return Ok(2);
    }

    let site = Site::new(&cli.site)?;
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("could not build the HTTP client")?;
    let mut client = PoliteClient::new(client, Duration::from_secs(cli.connection_wait));

    // Progress goes to stderr so `--dry-run --json` output stays parseable
    eprintln!("🔍 Resolving {} URL(s) on {}", urls.len(), site.base());

    let files = crawl::normalize_urls(&urls, &cli.formats, &site, &mut client).await?;

    eprintln!(
        "📚 Found {} file(s) after {} request(s)",
        files.len(),
        client.requests_made()
    );

    if files.is_empty() {
        eprintln!("⚠️  No files matched the requested formats");
        if !cli.dry_run {
            return Ok(0);
        }
    }

    let dir = download::resolve_dir(&cli.dir)?;

    if cli.dry_run {
        let plan = download::plan_downloads(&files, &dir, cli.trim_kepub)?;
        download::write_plan(&mut std::io::stdout().lock(), &plan, cli.json)?;
        return Ok(0);
    }

    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("could not create {}", dir.display()))?;
    info!(dir = %dir.display(), "downloading into");

    let plan = download::plan_downloads(&files, &dir, cli.trim_kepub)?;
    let summary = download::download_all(&plan, &mut client).await?;

    println!();
    println!("📊 Summary:");
    println!("   ✅ Files: {}", summary.files);
    println!("   💾 Bytes: {}", summary.bytes);
    println!("   📁 Directory: {}", dir.display());

    Ok(0)
}
