// src/input.rs
// =============================================================================
// Gathers the URLs to process: positional arguments first, then the lines of
// the --in file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};

/// One URL per line; blank lines are skipped.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("could not read URL file {}", path.display()))?;
    Ok(parse_url_list(&contents))
}

// Command-line URLs take priority, so they go first
pub async fn collect_urls(args: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut urls = args.to_vec();
    if let Some(path) = file {
        urls.extend(read_url_file(path).await?);
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_url_list_skips_blank_lines() {
        let contents = "https://standardebooks.org/ebooks/a\n\n  \r\nhttps://standardebooks.org/ebooks/b/c\r\n";
        assert_eq!(
            parse_url_list(contents),
            vec![
                "https://standardebooks.org/ebooks/a",
                "https://standardebooks.org/ebooks/b/c",
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_urls_args_first() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "https://standardebooks.org/from-file").unwrap();

        let args = vec!["https://standardebooks.org/from-args".to_string()];
        let urls = collect_urls(&args, Some(file.path())).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://standardebooks.org/from-args",
                "https://standardebooks.org/from-file",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let result = collect_urls(&[], Some(Path::new("/definitely/not/here.txt"))).await;
        assert!(result.is_err());
    }
}
