//! Configure-language-columns dialog
//!
//! Chooses which languages the project shows as columns: either every
//! language, or an explicit subset picked from the languages the project
//! actually has.

use crate::dialogs::checklist::{BulkFlags, CheckAction, CheckList};
use crate::dialogs::lifecycle::Form;
use crate::locale::{Culture, language_label};
use crate::project::Project;
use tracing::{debug, info};

/// Which languages are displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    All,
    Subset,
}

/// Enable flags of the dialog's controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnsUiState {
    pub checklist_enabled: bool,
    /// Check actions on the subset list; all off in `All` mode
    pub bulk: BulkFlags,
    pub can_accept: bool,
}

/// Every language code of `project`: the neutral language plus each file
/// group's languages, deduplicated and sorted ignoring case
pub fn project_language_codes(project: &Project) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    let candidates = std::iter::once(project.neutral_language.clone()).chain(
        project
            .file_groups
            .iter()
            .flat_map(|group| group.language_codes(project)),
    );
    for code in candidates {
        let code = code.trim().to_string();
        if code.is_empty() || codes.iter().any(|c| c.eq_ignore_ascii_case(&code)) {
            continue;
        }
        codes.push(code);
    }
    codes.sort_by_key(|c| c.to_lowercase());
    codes
}

/// Language-columns dialog controller
#[derive(Debug, Default)]
pub struct LanguageColumnsDialog {
    mode: DisplayMode,
    languages: CheckList<String>,
    ui: ColumnsUiState,
}

impl LanguageColumnsDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn languages(&self) -> &CheckList<String> {
        &self.languages
    }

    /// Cursor and rows, for navigation
    pub fn languages_mut(&mut self) -> &mut CheckList<String> {
        &mut self.languages
    }

    pub fn ui_state(&self) -> &ColumnsUiState {
        &self.ui
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.mode != mode {
            debug!(?mode, "Display mode changed");
            self.mode = mode;
            self.update_ui();
        }
    }

    pub fn toggle_mode(&mut self) {
        let mode = match self.mode {
            DisplayMode::All => DisplayMode::Subset,
            DisplayMode::Subset => DisplayMode::All,
        };
        self.set_mode(mode);
    }

    /// Check action on the subset list; ignored in `All` mode
    pub fn apply(&mut self, action: CheckAction) {
        if !self.ui.bulk.allows(action) {
            return;
        }
        self.languages.apply(action);
        self.update_ui();
    }

    /// Write the selection into `project` if it is acceptable
    pub fn accept(&mut self, project: &mut Project) -> bool {
        if !self.ui.can_accept {
            return false;
        }
        self.view_to_model(project);
        true
    }
}

impl Form for LanguageColumnsDialog {
    type Model = Project;

    fn name(&self) -> &'static str {
        "language-columns"
    }

    fn init_lists(&mut self, project: &Project) {
        self.languages.clear();
        for code in project_language_codes(project) {
            self.languages.push(language_label(&code), code, false);
        }
        self.languages.sort_by_label();
    }

    fn model_to_view(&mut self, project: &Project) {
        let cultures = project.languages_to_display();
        if cultures.is_empty() {
            self.mode = DisplayMode::All;
            return;
        }

        self.mode = DisplayMode::Subset;
        for culture in &cultures {
            let index = self
                .languages
                .items()
                .iter()
                .position(|item| culture.matches_code(&item.value));
            match index {
                Some(index) => self.languages.set_checked(index, true),
                None => debug!(culture = %culture, "Configured culture not in project"),
            }
        }
    }

    fn update_ui(&mut self) {
        let subset = self.mode == DisplayMode::Subset;
        self.ui = ColumnsUiState {
            checklist_enabled: subset,
            bulk: if subset {
                self.languages.bulk_flags()
            } else {
                BulkFlags::default()
            },
            can_accept: !subset || self.languages.checked_count() > 0,
        };
    }

    fn view_to_model(&mut self, project: &mut Project) {
        match self.mode {
            DisplayMode::All => project.set_languages_to_display(None),
            DisplayMode::Subset => {
                let cultures = self
                    .languages
                    .checked_values()
                    .iter()
                    .map(|code| Culture::tolerant(code))
                    .collect();
                project.set_languages_to_display(Some(cultures));
            }
        }
        info!(mode = ?self.mode, "Language columns applied");
    }
}
