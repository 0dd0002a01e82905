// src/download/files.rs
// =============================================================================
// Saves ebook files to disk.
//
// Strategy:
// - The local name is the last segment of the file URL
//   (".../downloads/jane-austen_emma.kepub.epub" -> "jane-austen_emma.kepub.epub")
// - With --trim-kepub, "*.kepub.epub" is saved as "*.kepub"
// - Files are fetched one by one through the same PoliteClient used for
//   crawling, so the pause between requests also applies here
// =============================================================================

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tokio::fs::File;
use tracing::warn;
use url::Url;

use crate::crawl::{PoliteClient, UrlSet};

const KEPUB_SUFFIX: &str = ".kepub.epub";

// One file to download and where it goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTarget {
    pub url: String,
    pub path: PathBuf,
}

// Totals for the final summary line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub files: usize,
    pub bytes: u64,
}

// Works out the local filename for a file URL
//
// Returns an error for URLs without a final path segment
// (e.g. "https://standardebooks.org/ebooks/"), since there is nothing to
// name the file after.
pub fn local_filename(url: &Url, trim_kepub: bool) -> Result<String> {
    let name = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("cannot derive a filename from {}", url))?;

    if trim_kepub && name.ends_with(KEPUB_SUFFIX) {
        // "book.kepub.epub" -> "book.kepub"
        return Ok(name.trim_end_matches(".epub").to_string());
    }

    Ok(name.to_string())
}

/// Makes a relative download directory absolute against the current one.
pub fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("could not read the current directory")?;
    Ok(cwd.join(dir))
}

/// Turns the set of file URLs into download targets under `dir`, sorted by URL.
///
/// URLs that differ only in query or fragment share a local path; the first
/// one in sort order is kept and the others are skipped.
pub fn plan_downloads(files: &UrlSet, dir: &Path, trim_kepub: bool) -> Result<Vec<FileTarget>> {
    let mut urls = files.to_vec();
    urls.sort();

    let mut taken = HashSet::new();
    let mut plan = Vec::new();
    for url in &urls {
        let path = dir.join(local_filename(url, trim_kepub)?);
        if !taken.insert(path.clone()) {
            warn!(%url, path = %path.display(), "skipping file with the same local name");
            continue;
        }
        plan.push(FileTarget {
            url: url.to_string(),
            path,
        });
    }

    Ok(plan)
}

/// Writes the plan as a table, or as a JSON array with `json`.
///
/// An empty plan is still written, so JSON output is always a valid document.
pub fn write_plan<W: Write>(out: &mut W, plan: &[FileTarget], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, plan)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "{:<80} {}", "URL", "FILE")?;
    writeln!(out, "{}", "=".repeat(105))?;
    for target in plan {
        writeln!(out, "{:<80} {}", target.url, target.path.display())?;
    }
    Ok(())
}

/// Downloads every target in order. Stops at the first failure.
pub async fn download_all(targets: &[FileTarget], client: &mut PoliteClient) -> Result<DownloadSummary> {
    let mut summary = DownloadSummary::default();

    for target in targets {
        let url = Url::parse(&target.url).with_context(|| format!("invalid file URL {}", target.url))?;

        println!("   ⬇️  {} -> {}", url, target.path.display());

        let mut file = File::create(&target.path)
            .await
            .with_context(|| format!("could not create {}", target.path.display()))?;

        match client.download_to(&url, &mut file).await {
            Ok(bytes) => {
                summary.files += 1;
                summary.bytes += bytes;
            }
            Err(e) => {
                drop(file);
                if let Err(remove_err) = tokio::fs::remove_file(&target.path).await {
                    warn!(path = %target.path.display(), error = %remove_err, "could not remove partial file");
                }
                return Err(e);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_local_filename_last_segment() {
        let u = url("https://standardebooks.org/ebooks/a/b/downloads/a_b.epub");
        assert_eq!(local_filename(&u, false).unwrap(), "a_b.epub");
    }

    #[test]
    fn test_local_filename_trim_kepub() {
        let u = url("https://standardebooks.org/ebooks/a/b/downloads/a_b.kepub.epub");
        assert_eq!(local_filename(&u, true).unwrap(), "a_b.kepub");
        assert_eq!(local_filename(&u, false).unwrap(), "a_b.kepub.epub");

        // Only kepub files are renamed
        let plain = url("https://standardebooks.org/ebooks/a/b/downloads/a_b.epub");
        assert_eq!(local_filename(&plain, true).unwrap(), "a_b.epub");
    }

    #[test]
    fn test_local_filename_needs_segment() {
        assert!(local_filename(&url("https://standardebooks.org/ebooks/"), false).is_err());
    }

    #[test]
    fn test_plan_is_sorted_and_joined() {
        let mut files = UrlSet::new();
        files.add([
            url("https://standardebooks.org/d/z.azw3"),
            url("https://standardebooks.org/d/a.epub"),
        ]);

        let plan = plan_downloads(&files, Path::new("/books"), false).unwrap();
        assert_eq!(
            plan,
            vec![
                FileTarget {
                    url: "https://standardebooks.org/d/a.epub".to_string(),
                    path: PathBuf::from("/books/a.epub"),
                },
                FileTarget {
                    url: "https://standardebooks.org/d/z.azw3".to_string(),
                    path: PathBuf::from("/books/z.azw3"),
                },
            ]
        );
    }

    #[test]
    fn test_plan_skips_same_local_path() {
        let mut files = UrlSet::new();
        files.add([
            url("https://standardebooks.org/d/a.epub?source=download"),
            url("https://standardebooks.org/d/a.epub"),
            url("https://standardebooks.org/d/b.epub"),
        ]);

        let plan = plan_downloads(&files, Path::new("/books"), false).unwrap();
        assert_eq!(
            plan,
            vec![
                FileTarget {
                    url: "https://standardebooks.org/d/a.epub".to_string(),
                    path: PathBuf::from("/books/a.epub"),
                },
                FileTarget {
                    url: "https://standardebooks.org/d/b.epub".to_string(),
                    path: PathBuf::from("/books/b.epub"),
                },
            ]
        );
    }

    #[test]
    fn test_resolve_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_dir(Path::new(".")).unwrap(), cwd.join("."));
        assert_eq!(resolve_dir(Path::new("books")).unwrap(), cwd.join("books"));
        assert_eq!(resolve_dir(Path::new("/srv/books")).unwrap(), PathBuf::from("/srv/books"));
    }

    #[test]
    fn test_write_plan_empty_json_is_array() {
        let mut out = Vec::new();
        write_plan(&mut out, &[], true).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
    }

    #[test]
    fn test_write_plan_json_fields() {
        let plan = vec![FileTarget {
            url: "https://standardebooks.org/d/a.azw3".to_string(),
            path: PathBuf::from("/books/a.azw3"),
        }];
        let mut out = Vec::new();
        write_plan(&mut out, &plan, true).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["url"], "https://standardebooks.org/d/a.azw3");
        assert_eq!(parsed[0]["path"], "/books/a.azw3");
    }

    #[test]
    fn test_write_plan_table() {
        let plan = vec![
            FileTarget {
                url: "https://standardebooks.org/d/a.epub".to_string(),
                path: PathBuf::from("/books/a.epub"),
            },
            FileTarget {
                url: "https://standardebooks.org/d/b.azw3".to_string(),
                path: PathBuf::from("/books/b.azw3"),
            },
        ];
        let mut out = Vec::new();
        write_plan(&mut out, &plan, false).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("URL"));
        assert!(lines[0].ends_with("FILE"));
        assert!(lines[2].starts_with("https://standardebooks.org/d/a.epub"));
        assert!(lines[2].ends_with("/books/a.epub"));
        assert!(lines[3].ends_with("/books/b.azw3"));
    }

    #[test]
    fn test_write_plan_empty_table_has_header() {
        let mut out = Vec::new();
        write_plan(&mut out, &[], false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_download_all_writes_files() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloads/a.epub"))
            .respond_with(ResponseTemplate::new(200).set_body_string("first"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/downloads/b.kepub.epub"))
            .respond_with(ResponseTemplate::new(200).set_body_string("second!"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().expect("failed to create temp dir");
        let mut files = UrlSet::new();
        files.add([
            url(&format!("{}/downloads/a.epub", server.uri())),
            url(&format!("{}/downloads/b.kepub.epub", server.uri())),
        ]);
        let plan = plan_downloads(&files, dir.path(), true).unwrap();

        let mut client = PoliteClient::new(Client::new(), Duration::ZERO);
        let summary = download_all(&plan, &mut client).await.unwrap();

        assert_eq!(summary, DownloadSummary { files: 2, bytes: 12 });
        assert_eq!(std::fs::read_to_string(dir.path().join("a.epub")).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(dir.path().join("b.kepub")).unwrap(), "second!");
    }

    #[tokio::test]
    async fn test_download_failure_leaves_no_partial_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloads/gone.epub"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().expect("failed to create temp dir");
        let mut files = UrlSet::new();
        files.add([url(&format!("{}/downloads/gone.epub", server.uri()))]);
        let plan = plan_downloads(&files, dir.path(), false).unwrap();

        let mut client = PoliteClient::new(Client::new(), Duration::ZERO);
        assert!(download_all(&plan, &mut client).await.is_err());
        assert!(!dir.path().join("gone.epub").exists());
    }
}
