//! Collaborators behind the dialogs
//!
//! The wizard never reads spreadsheets itself. It asks a [`FileGroupDetector`]
//! and a [`LanguageDetector`] what a file contains, and hands the user's
//! choices to an [`ImportProcessor`] running on a worker thread.

pub mod viewer;
pub mod workbook;

use crate::error::ImportError;
use crate::project::{FileGroup, Project};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

pub use viewer::{SpreadsheetViewer, SystemViewer};
pub use workbook::WorkbookBackend;

/// Detects the file groups contained in a spreadsheet
pub trait FileGroupDetector {
    /// `None` when the file cannot be inspected at all
    fn detect_file_groups(&self, project: &Project, path: &Path) -> Option<Vec<FileGroup>>;
}

/// Detects the language codes contained in a spreadsheet
pub trait LanguageDetector {
    /// `None` when the file cannot be inspected at all
    fn detect_languages(&self, path: &Path) -> Option<Vec<String>>;
}

/// Runs an import
pub trait ImportProcessor {
    fn process(
        &self,
        request: &ImportRequest,
        context: &ImportContext,
    ) -> Result<ImportSummary, ImportError>;
}

/// Everything the import wizard needs from the outside world
pub trait ImportBackend:
    FileGroupDetector + LanguageDetector + ImportProcessor + Send + Sync
{
}

impl<T> ImportBackend for T where
    T: FileGroupDetector + LanguageDetector + ImportProcessor + Send + Sync
{
}

/// Immutable snapshot of the user's choices at submission time
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub project: Arc<Project>,
    pub source_path: PathBuf,
    pub file_groups: Vec<FileGroup>,
    pub language_codes: Vec<String>,
}

/// Outcome of a successful import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// File groups imported
    pub file_groups: usize,
    /// Languages imported
    pub languages: usize,
    /// Translations written
    pub entries: usize,
    /// Resource files written
    pub files_written: usize,
}

/// Message sent from the worker to the UI thread
#[derive(Debug)]
pub enum WorkerEvent {
    /// Progress text; empty hides the progress label
    Progress(String),
    /// Worker terminated
    Finished(Result<ImportSummary, ImportError>),
}

/// Handle given to an [`ImportProcessor`] for reporting and cancellation
#[derive(Debug, Clone)]
pub struct ImportContext {
    cancel: Arc<AtomicBool>,
    events: Option<Sender<WorkerEvent>>,
}

impl ImportContext {
    /// Build a context around a cancel flag and an event channel
    pub fn new(cancel: Arc<AtomicBool>, events: Sender<WorkerEvent>) -> Self {
        Self {
            cancel,
            events: Some(events),
        }
    }

    /// Context that reports nowhere and is never cancelled
    pub fn detached() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            events: None,
        }
    }

    /// Report progress to the UI
    pub fn report(&self, message: impl Into<String>) {
        if let Some(events) = &self.events {
            let _ = events.send(WorkerEvent::Progress(message.into()));
        }
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation was requested
    pub fn check_cancelled(&self) -> Result<(), ImportError> {
        if self.is_cancelled() {
            Err(ImportError::Cancelled)
        } else {
            Ok(())
        }
    }
}
