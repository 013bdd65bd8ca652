use std::path::Path;

/// Read a log file as text
///
/// Invalid UTF-8 is replaced; a missing or unreadable file reads as empty.
pub async fn read_log_text(path: &Path) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "log file not readable");
            String::new()
        }
    }
}

/// The last `n` lines of `text`
pub fn last_lines(text: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(|line| (*line).to_string()).collect()
}

/// The last `n` lines of the file at `path`
pub async fn tail_lines(path: &Path, n: usize) -> Vec<String> {
    last_lines(&read_log_text(path).await, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_last_lines_shorter_than_limit() {
        assert_eq!(last_lines("a\nb", 5), vec!["a", "b"]);
    }

    #[test]
    fn test_last_lines_truncates_from_front() {
        let text = (1..=60).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let tail = last_lines(&text, 50);
        assert_eq!(tail.len(), 50);
        assert_eq!(tail.first().map(String::as_str), Some("11"));
        assert_eq!(tail.last().map(String::as_str), Some("60"));
    }

    #[test]
    fn test_last_lines_empty() {
        assert!(last_lines("", 50).is_empty());
        assert!(last_lines("a\nb", 0).is_empty());
    }

    #[tokio::test]
    async fn test_tail_of_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(tail_lines(&dir.path().join("missing.log"), 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.log");
        std::fs::write(&path, b"ok\n\xff\xfe broken\n").unwrap();

        let tail = tail_lines(&path, 10).await;
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0], "ok");
        assert!(tail[1].ends_with("broken"));
    }
}
