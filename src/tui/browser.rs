//! Spreadsheet file browser
//!
//! Lists one directory at a time: a parent entry, sub-directories, then the
//! files with a supported spreadsheet extension.

use crate::dialogs::{Selectable, SelectionState};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A row of the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEntry {
    Parent(PathBuf),
    Directory(PathBuf),
    File(PathBuf),
}

impl BrowserEntry {
    /// Row label
    pub fn label(&self) -> String {
        match self {
            BrowserEntry::Parent(_) => "..".to_string(),
            BrowserEntry::Directory(path) => format!("{}/", file_name(path)),
            BrowserEntry::File(path) => file_name(path),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// File browser popup state
#[derive(Debug, Clone)]
pub struct FileBrowser {
    dir: PathBuf,
    extensions: Vec<String>,
    entries: Vec<BrowserEntry>,
    selection: SelectionState,
    error: Option<String>,
}

impl FileBrowser {
    /// Open on `dir`, listing files with one of `extensions`
    pub fn open(dir: &Path, extensions: &[String]) -> Self {
        let mut browser = Self {
            dir: dir.to_path_buf(),
            extensions: extensions.to_vec(),
            entries: Vec::new(),
            selection: SelectionState::default(),
            error: None,
        };
        browser.reload();
        browser
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[BrowserEntry] {
        &self.entries
    }

    /// Listing error of the current directory
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    fn reload(&mut self) {
        match list_directory(&self.dir, &self.extensions) {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Failed to list directory");
                self.entries = Vec::new();
                self.error = Some(e.to_string());
            }
        }
        if let Some(parent) = self.dir.parent() {
            self.entries.insert(0, BrowserEntry::Parent(parent.to_path_buf()));
        }
        self.selection = SelectionState::with_count(self.entries.len());
        debug!(dir = %self.dir.display(), entries = self.entries.len(), "Browsing");
    }

    fn change_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.reload();
    }

    /// Go to the parent directory
    pub fn go_up(&mut self) {
        if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
            self.change_dir(parent);
        }
    }

    /// Enter the selected directory, or return the selected file
    pub fn activate(&mut self) -> Option<PathBuf> {
        let entry = self
            .selection
            .selected()
            .and_then(|i| self.entries.get(i))
            .cloned()?;
        match entry {
            BrowserEntry::Parent(dir) | BrowserEntry::Directory(dir) => {
                self.change_dir(dir);
                None
            }
            BrowserEntry::File(path) => Some(path),
        }
    }
}

/// Sub-directories and matching files of `dir`, each group sorted by name
pub fn list_directory(dir: &Path, extensions: &[String]) -> Result<Vec<BrowserEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path().to_path_buf();
        if entry.file_type().is_dir() {
            dirs.push(path);
        } else if has_extension(&path, extensions) {
            files.push(path);
        }
    }

    let by_name = |p: &PathBuf| file_name(p).to_lowercase();
    dirs.sort_by_key(by_name);
    files.sort_by_key(by_name);

    Ok(dirs
        .into_iter()
        .map(BrowserEntry::Directory)
        .chain(files.into_iter().map(BrowserEntry::File))
        .collect())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn extensions() -> Vec<String> {
        vec!["xls".into(), "xlsx".into()]
    }

    #[test]
    fn test_lists_directories_then_spreadsheets() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("b.XLSX"), b"").unwrap();
        fs::write(dir.path().join("a.xls"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let labels: Vec<String> = list_directory(dir.path(), &extensions())
            .unwrap()
            .iter()
            .map(BrowserEntry::label)
            .collect();
        assert_eq!(labels, vec!["nested/", "a.xls", "b.XLSX"]);
    }

    #[test]
    fn test_activate_enters_directories_and_returns_files() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("book.xlsx"), b"").unwrap();

        let mut browser = FileBrowser::open(dir.path(), &extensions());
        assert!(matches!(browser.entries()[0], BrowserEntry::Parent(_)));

        browser.selection_mut().select(1);
        assert_eq!(browser.activate(), None);
        assert_eq!(browser.dir(), nested.as_path());

        browser.selection_mut().select(1);
        assert_eq!(browser.activate(), Some(nested.join("book.xlsx")));

        browser.go_up();
        assert_eq!(browser.dir(), dir.path());
    }

    #[test]
    fn test_missing_directory_reports_error() {
        let dir = tempdir().unwrap();
        let browser = FileBrowser::open(&dir.path().join("gone"), &extensions());
        assert!(browser.error().is_some());
        assert_eq!(browser.entries().len(), 1);
    }
}
