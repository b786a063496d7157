//! Whole-file text IO
//!
//! Files are read completely, transformed in memory and written back through
//! a temporary sibling that replaces the original only once it is fully on
//! disk. An interrupted run leaves either the old or the new content.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Text content of a file plus whether invalid UTF-8 had to be replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub content: String,
    pub lossy: bool,
}

pub fn read_text(path: &Path) -> io::Result<TextFile> {
    let bytes = fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(TextFile {
            content,
            lossy: false,
        }),
        Err(e) => Ok(TextFile {
            content: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            lossy: true,
        }),
    }
}

/// Write-complete-then-replace
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Message.txt");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
        // No temporary files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.txt");

        write_atomic(&path, b"hello").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_read_text_lossy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 bob@example.com").unwrap();

        let text = read_text(&path).unwrap();
        assert!(text.lossy);
        assert!(text.content.contains("bob@example.com"));

        fs::write(&path, "plain").unwrap();
        let text = read_text(&path).unwrap();
        assert!(!text.lossy);
        assert_eq!(text.content, "plain");
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_text(&dir.path().join("nope.txt")).is_err());
    }
}
