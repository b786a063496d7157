//! Export tree walking and entry classification
//!
//! The tree layout below the root is defined by the extraction tool and is
//! not assumed here beyond "a message folder contains files". Walks are
//! sorted by file name so every run visits entries in the same order.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use sar_core::{Error, FileIssue, Result};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::denylist::Denylist;

/// Folder name the extraction tool uses for a message's attachments
pub const ATTACHMENTS_FOLDER: &str = "Attachments";

/// Where the pipeline keeps its own by-products below the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    pub attachments_dir: String,
    pub state_dir: String,
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self {
            attachments_dir: "attachments".to_string(),
            state_dir: ".sar".to_string(),
        }
    }
}

/// What a file in the tree is, decided once per walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Pipeline state (stage sentinels)
    State,
    /// Already relocated into the flat attachments directory
    RelocatedAttachment,
    /// Extraction metadata on the denylist
    Metadata,
    /// Rich message body awaiting conversion
    HtmlBody,
    /// Headers, plain bodies and item text files
    MessageText,
    /// Any other file belonging to a message
    Attachment,
}

#[derive(Debug, Clone)]
pub struct ExportTree {
    root: PathBuf,
    layout: TreeLayout,
}

impl ExportTree {
    /// Open an export tree, failing if the root is missing or not a directory
    pub fn open(root: impl Into<PathBuf>, layout: TreeLayout) -> Result<Self> {
        let root = root.into();
        let metadata = fs::metadata(&root).map_err(|_| Error::RootNotFound(root.clone()))?;
        if !metadata.is_dir() {
            return Err(Error::RootNotDirectory(root));
        }
        fs::read_dir(&root)?;

        Ok(Self { root, layout })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn attachments_path(&self) -> PathBuf {
        self.root.join(&self.layout.attachments_dir)
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(&self.layout.state_dir)
    }

    /// Path relative to the root, for reports
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    pub fn classify(&self, path: &Path, denylist: &Denylist) -> EntryKind {
        let relative = self.relative(path);

        if relative.starts_with(&self.layout.state_dir) {
            return EntryKind::State;
        }
        if relative.starts_with(&self.layout.attachments_dir) {
            return EntryKind::RelocatedAttachment;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if denylist.is_denied(&file_name) {
            return EntryKind::Metadata;
        }

        let in_attachments_folder = relative
            .parent()
            .map(|parent| {
                parent.components().any(|c| {
                    c.as_os_str()
                        .to_string_lossy()
                        .eq_ignore_ascii_case(ATTACHMENTS_FOLDER)
                })
            })
            .unwrap_or(false);

        // Anything under an Attachments folder is an attachment, HTML included
        if in_attachments_folder {
            EntryKind::Attachment
        } else if has_extension(path, &["html", "htm"]) {
            EntryKind::HtmlBody
        } else if has_extension(path, &["txt"]) {
            EntryKind::MessageText
        } else {
            EntryKind::Attachment
        }
    }

    /// Every regular file outside the state directory, sorted by path
    pub fn files(&self) -> (Vec<PathBuf>, Vec<FileIssue>) {
        let mut files = Vec::new();
        let mut issues = Vec::new();
        let state = self.state_path();

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() != state)
        {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    issues.push(FileIssue::new(self.relative(&path), e));
                }
            }
        }

        (files, issues)
    }

    /// Every `.txt` file outside the state directory, sorted by path
    pub fn text_files(&self) -> (Vec<PathBuf>, Vec<FileIssue>) {
        let (files, issues) = self.files();
        let text = files
            .into_iter()
            .filter(|p| has_extension(p, &["txt"]))
            .collect();
        (text, issues)
    }

    /// Remove folders with no files and no non-empty subfolders.
    ///
    /// `removed` lists files already deleted (or, in a dry run, that would
    /// have been) so a dry run reports the same folders a real run prunes.
    /// The root and the state directory are never removed.
    pub fn prune_empty_dirs(
        &self,
        removed: &HashSet<PathBuf>,
        dry_run: bool,
    ) -> (Vec<PathBuf>, Vec<FileIssue>) {
        let mut gone: HashSet<PathBuf> = removed.clone();
        let mut pruned = Vec::new();
        let mut issues = Vec::new();
        let state = self.state_path();

        let dirs: Vec<DirEntry> = WalkDir::new(&self.root)
            .min_depth(1)
            .contents_first(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() != state)
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    issues.push(FileIssue::new(self.relative(&path), err));
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .collect();

        for dir in dirs {
            let path = dir.path();
            let empty = match fs::read_dir(path) {
                Ok(children) => children
                    .filter_map(|c| c.ok())
                    .all(|c| gone.contains(&c.path())),
                Err(e) => {
                    issues.push(FileIssue::new(self.relative(path), e));
                    false
                }
            };

            if !empty {
                continue;
            }

            if !dry_run && let Err(e) = fs::remove_dir(path) {
                issues.push(FileIssue::new(self.relative(path), e));
                continue;
            }

            debug!("Pruned empty folder {}", path.display());
            gone.insert(path.to_path_buf());
            pruned.push(self.relative(path));
        }

        (pruned, issues)
    }
}

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x").unwrap();
        path
    }

    #[test]
    fn test_open_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = ExportTree::open(dir.path().join("missing"), TreeLayout::default()).unwrap_err();
        assert!(matches!(err, Error::RootNotFound(_)));

        let file = touch(dir.path(), "file.txt");
        let err = ExportTree::open(file, TreeLayout::default()).unwrap_err();
        assert!(matches!(err, Error::RootNotDirectory(_)));
    }

    #[test]
    fn test_classify() {
        let dir = TempDir::new().unwrap();
        let tree = ExportTree::open(dir.path(), TreeLayout::default()).unwrap();
        let denylist = Denylist::metadata(&[]);
        let root = dir.path();

        let cases = [
            (".sar/normalize.done", EntryKind::State),
            ("attachments/Jane_Doe.pdf", EntryKind::RelocatedAttachment),
            ("Inbox/Message00001/ConversationIndex.txt", EntryKind::Metadata),
            ("Inbox/Message00001/Message.HTML", EntryKind::HtmlBody),
            ("Inbox/Message00001/OutlookHeaders.txt", EntryKind::MessageText),
            ("item.txt", EntryKind::MessageText),
            ("Inbox/Message00001/Attachments/notes.txt", EntryKind::Attachment),
            ("Inbox/Message00001/Attachments/invoice.pdf", EntryKind::Attachment),
            ("Inbox/Message00001/Attachments/flyer.html", EntryKind::Attachment),
            ("Inbox/Message00001/attachments/nested/cv.HTM", EntryKind::Attachment),
            ("Inbox/Message00001/Message.rtf", EntryKind::Attachment),
        ];

        for (rel, expected) in cases {
            assert_eq!(tree.classify(&root.join(rel), &denylist), expected, "{}", rel);
        }
    }

    #[test]
    fn test_files_skip_state_dir() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/Message.txt");
        touch(dir.path(), "a/OutlookHeaders.txt");
        touch(dir.path(), "a/Attachments/x.pdf");
        touch(dir.path(), ".sar/headers.done");
        let tree = ExportTree::open(dir.path(), TreeLayout::default()).unwrap();

        let (files, issues) = tree.files();
        assert!(issues.is_empty());
        let rel: Vec<_> = files.iter().map(|p| tree.relative(p)).collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("a/Attachments/x.pdf"),
                PathBuf::from("a/OutlookHeaders.txt"),
                PathBuf::from("b/Message.txt"),
            ]
        );

        let (text, _) = tree.text_files();
        assert_eq!(text.len(), 2);
    }

    #[test]
    fn test_prune_empty_dirs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "keep/Message.txt");
        fs::create_dir_all(dir.path().join("Top of Personal Folders/Deleted Items/Empty")).unwrap();
        fs::create_dir_all(dir.path().join(".sar")).unwrap();
        let tree = ExportTree::open(dir.path(), TreeLayout::default()).unwrap();

        let (pruned, issues) = tree.prune_empty_dirs(&HashSet::new(), false);
        assert!(issues.is_empty());
        assert_eq!(pruned.len(), 3);
        assert!(!dir.path().join("Top of Personal Folders").exists());
        assert!(dir.path().join("keep/Message.txt").exists());
        assert!(dir.path().join(".sar").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_prune_dry_run_honours_removed_set() {
        let dir = TempDir::new().unwrap();
        let meta = touch(dir.path(), "Message00001/Recipients.txt");
        let tree = ExportTree::open(dir.path(), TreeLayout::default()).unwrap();

        let removed: HashSet<PathBuf> = [meta.clone()].into_iter().collect();
        let (pruned, _) = tree.prune_empty_dirs(&removed, true);

        assert_eq!(pruned, vec![PathBuf::from("Message00001")]);
        assert!(meta.exists());
    }
}
