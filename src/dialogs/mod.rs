//! Dialog controllers
//!
//! Controllers hold view state and enable flags only; they never draw.
//! The terminal host in [`crate::tui`] renders them and forwards input.

pub mod checklist;
pub mod import_wizard;
pub mod language_columns;
pub mod lifecycle;
pub mod selection;
pub mod worker;

pub use checklist::{BulkFlags, CheckAction, CheckItem, CheckList, CheckStates};
pub use import_wizard::{
    CancelAction, ErrorInspector, ErrorReport, ImportWizard, Selections, UiState, WizardOutcome,
    WizardPage, derive_ui_state, is_importable_source,
};
pub use language_columns::{ColumnsUiState, DisplayMode, LanguageColumnsDialog};
pub use lifecycle::{Form, open_form};
pub use selection::{Selectable, SelectionState};
pub use worker::ImportTask;
