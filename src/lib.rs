//! Sheet Import - spreadsheet translation import for resource projects
//!
//! This library provides the two dialogs of a resource-translation tool:
//! - the Import-from-spreadsheet wizard, with a background import worker
//!   and cooperative cancellation
//! - the language-columns dialog that filters the displayed languages
//!
//! plus the project model, hierarchical settings stores, a calamine-based
//! workbook backend and a ratatui host for both dialogs.

// Initialize i18n with locale files
rust_i18n::i18n!("locales", fallback = "en");

pub mod backend;
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod i18n;
pub mod locale;
pub mod project;
pub mod settings;
pub mod tui;

pub use backend::{ImportBackend, ImportRequest, ImportSummary, SystemViewer, WorkbookBackend};
pub use cli::{Cli, Command};
pub use config::{AppConfig, ConfigError};
pub use dialogs::{Form, ImportWizard, LanguageColumnsDialog, WizardOutcome, open_form};
pub use error::{Error, ImportError, Result};
pub use i18n::init_locale;
pub use locale::Culture;
pub use project::{FileGroup, Project};
pub use settings::SettingsStore;
pub use tui::TuiApp;
