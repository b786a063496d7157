//! Attachment relevance and relocation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sar_core::{Error, Result};

/// Decides whether an attachment file name belongs to the data subject.
///
/// Both sides are transliterated to ASCII, lowercased and have every run of
/// non-alphanumeric characters collapsed to one space, then compared as a
/// substring. `"Jane Doe"` therefore matches `Jane_Doe_report.pdf` and
/// `JANE.DOE.docx` but not `janedoe.pdf`.
#[derive(Debug, Clone)]
pub struct SubjectMatcher {
    tokens: Vec<(String, String)>,
}

impl SubjectMatcher {
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let tokens: Vec<(String, String)> = tokens
            .iter()
            .map(|t| (t.as_ref().trim().to_string(), normalize_name(t.as_ref())))
            .filter(|(_, normalized)| !normalized.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(Error::Config(
                "at least one subject token with letters or digits is required".to_string(),
            ));
        }

        Ok(Self { tokens })
    }

    pub fn is_relevant(&self, file_name: &str) -> bool {
        self.matching_token(file_name).is_some()
    }

    /// The first token (as given) that matches the file name
    pub fn matching_token(&self, file_name: &str) -> Option<&str> {
        let normalized = normalize_name(file_name);
        self.tokens
            .iter()
            .find(|(_, token)| normalized.contains(token.as_str()))
            .map(|(original, _)| original.as_str())
    }
}

pub fn normalize_name(value: &str) -> String {
    let folded = deunicode::deunicode(value).to_lowercase();
    folded
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First free path for `file_name` in `dir`: `name.ext`, `name (1).ext`, ...
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    unique_destination_with(dir, file_name, |p| p.exists())
}

/// As [`unique_destination`], with the caller deciding which paths are taken
pub fn unique_destination_with(
    dir: &Path,
    file_name: &str,
    taken: impl Fn(&Path) -> bool,
) -> PathBuf {
    let candidate = dir.join(file_name);
    if !taken(&candidate) {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, ext));
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Move `src` into `dir` without overwriting anything; returns the new path
pub fn relocate(src: &Path, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let file_name = src
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy()
        .into_owned();
    let dest = unique_destination(dir, &file_name);

    if let Err(rename_err) = fs::rename(src, &dest) {
        // Different filesystem: copy, then remove the original
        if fs::copy(src, &dest).is_err() {
            let _ = fs::remove_file(&dest);
            return Err(rename_err);
        }
        fs::remove_file(src)?;
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_subject_matching() {
        let matcher = SubjectMatcher::new(&["Jane Doe"]).unwrap();

        assert!(matcher.is_relevant("Jane_Doe_report.pdf"));
        assert!(matcher.is_relevant("jane-doe.docx"));
        assert!(matcher.is_relevant("Re JANE.DOE notes.xlsx"));
        assert!(!matcher.is_relevant("invoice.pdf"));
        assert!(!matcher.is_relevant("janedoe.pdf"));
    }

    #[test]
    fn test_subject_matching_folds_accents() {
        let matcher = SubjectMatcher::new(&["José Núñez", "J. Nunez"]).unwrap();

        assert_eq!(matcher.matching_token("jose_nunez_cv.docx"), Some("José Núñez"));
        assert_eq!(matcher.matching_token("Letter to J Nunez.pdf"), Some("J. Nunez"));
        assert_eq!(matcher.matching_token("minutes.pdf"), None);
    }

    #[test]
    fn test_subject_requires_a_token() {
        assert!(SubjectMatcher::new(&["  ", "--"]).is_err());
        assert!(SubjectMatcher::new::<&str>(&[]).is_err());
    }

    #[test]
    fn test_unique_destination() {
        let dir = TempDir::new().unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a.pdf"));

        fs::write(dir.path().join("a.pdf"), "1").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a (1).pdf"));

        fs::write(dir.path().join("a (1).pdf"), "2").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.pdf"), dir.path().join("a (2).pdf"));

        let planned = dir.path().join("a (2).pdf");
        assert_eq!(
            unique_destination_with(dir.path(), "a.pdf", |p| p.exists() || p == planned),
            dir.path().join("a (3).pdf")
        );

        fs::write(dir.path().join("README"), "x").unwrap();
        assert_eq!(unique_destination(dir.path(), "README"), dir.path().join("README (1)"));
    }

    #[test]
    fn test_relocate_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("attachments");
        let first = dir.path().join("m1/Jane_Doe.pdf");
        let second = dir.path().join("m2/Jane_Doe.pdf");
        fs::create_dir_all(first.parent().unwrap()).unwrap();
        fs::create_dir_all(second.parent().unwrap()).unwrap();
        fs::write(&first, "first").unwrap();
        fs::write(&second, "second").unwrap();

        let a = relocate(&first, &out).unwrap();
        let b = relocate(&second, &out).unwrap();

        assert_eq!(a, out.join("Jane_Doe.pdf"));
        assert_eq!(b, out.join("Jane_Doe (1).pdf"));
        assert_eq!(fs::read_to_string(a).unwrap(), "first");
        assert_eq!(fs::read_to_string(b).unwrap(), "second");
        assert!(!first.exists());
        assert!(!second.exists());
    }
}
