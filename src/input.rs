//! Stdin and file input utilities.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

/// Read from stdin if piped (not a terminal).
///
/// Returns the content read from stdin, or an empty string if stdin is a terminal.
/// When `trim` is true, leading and trailing whitespace is removed.
pub fn read_stdin(trim: bool) -> String {
    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        if io::stdin().read_to_string(&mut buffer).is_ok() {
            return if trim {
                buffer.trim().to_string()
            } else {
                buffer
            };
        }
    }
    String::new()
}

/// Read a file, or stdin when the path is `-` or absent.
pub fn read_source(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).map_err(|e| format!("failed to read {}: {}", p.display(), e))
        }
        _ => {
            let content = read_stdin(false);
            if content.is_empty() {
                Err("no input: pass a file or pipe content on stdin".to_string())
            } else {
                Ok(content)
            }
        }
    }
}

/// Content from `--content`, a `--file`, or stdin, in that order.
pub fn content_arg(inline: Option<&str>, file: Option<&Path>) -> Result<String, String> {
    if let Some(text) = inline {
        return Ok(text.to_string());
    }
    if let Some(path) = file {
        return read_source(Some(path));
    }
    Ok(read_stdin(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        fs::write(&path, "## Hi\n").unwrap();
        assert_eq!(read_source(Some(&path)).unwrap(), "## Hi\n");
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Some(Path::new("/nonexistent/post.md"))).unwrap_err();
        assert!(err.contains("failed to read"));
    }

    #[test]
    fn test_inline_content_wins() {
        assert_eq!(
            content_arg(Some("body"), Some(Path::new("/nonexistent"))).unwrap(),
            "body"
        );
    }
}
