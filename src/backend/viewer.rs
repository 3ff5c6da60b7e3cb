//! External spreadsheet viewer

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Application able to display a spreadsheet
pub trait SpreadsheetViewer: Send + Sync {
    /// Whether an application is registered for spreadsheets
    fn is_available(&self) -> bool;

    /// Open `path` in that application
    fn open(&self, path: &Path) -> Result<()>;
}

/// Global availability, checked once per process
static VIEWER_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// The operating system's default handler for `.xls` files
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemViewer;

impl SystemViewer {
    pub fn new() -> Self {
        Self
    }
}

impl SpreadsheetViewer for SystemViewer {
    fn is_available(&self) -> bool {
        *VIEWER_AVAILABLE.get_or_init(detect_viewer)
    }

    fn open(&self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "Opening spreadsheet in external viewer");
        open::that(path).map_err(|e| Error::ViewerLaunch {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Check the platform's file association for `.xls`
fn detect_viewer() -> bool {
    let available = has_association();
    debug!(available, "Spreadsheet viewer lookup");
    available
}

#[cfg(windows)]
fn has_association() -> bool {
    Command::new("cmd")
        .args(["/C", "assoc", ".xls"])
        .output()
        .map(|output| output.status.success() && !output.stdout.is_empty())
        .unwrap_or(false)
}

#[cfg(target_os = "macos")]
fn has_association() -> bool {
    Command::new("open")
        .args(["-Ra", "Numbers"])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
        || Command::new("open")
            .args(["-Ra", "Microsoft Excel"])
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn has_association() -> bool {
    Command::new("xdg-mime")
        .args(["query", "default", "application/vnd.ms-excel"])
        .output()
        .map(|output| {
            output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty()
        })
        .unwrap_or(false)
}

#[cfg(not(any(windows, unix)))]
fn has_association() -> bool {
    false
}
