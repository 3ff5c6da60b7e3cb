//! Import-from-Excel wizard
//!
//! ```text
//! FileSelect -> [FileGroups] -> Languages -> Progress -> Success
//!                                   ^            |
//!                                   +-- Error <--+
//! ```
//!
//! The FileGroups page exists only when the chosen workbook contains at
//! least one of the allowed file groups; otherwise navigation skips it in
//! both directions. All enable flags come from [`derive_ui_state`], which
//! is recomputed after every mutation.

use crate::backend::{
    ImportBackend, ImportRequest, ImportSummary, SpreadsheetViewer, WorkerEvent,
};
use crate::dialogs::checklist::{BulkFlags, CheckAction, CheckList, CheckStates};
use crate::dialogs::lifecycle::Form;
use crate::dialogs::selection::Selectable;
use crate::dialogs::worker::ImportTask;
use crate::error::{Error, ImportError, Result};
use crate::locale::{is_valid_culture_name, language_label};
use crate::project::{FileGroup, Project};
use crate::settings::SettingsStore;
use chrono::Local;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Last chosen workbook
pub const SOURCE_PATH_KEY: &str = "receiveFileFromTranslator.sourceFilePathTextEdit.Text";
/// File group check-states, keyed by checksum
pub const FILE_GROUPS_KEY: &str = "receiveFileFromTranslator.fileGroupsListBox";
/// Language check-states, keyed by code
pub const LANGUAGES_KEY: &str = "receiveFileFromTranslator.languagesToImportCheckListBox";
/// Last browse directory, kept in the global settings store
pub const BROWSE_DIRECTORY_KEY: &str =
    "receiveFileFromTranslator.destinationFilePathTextEdit.InitialDirectory";

/// Default spreadsheet extensions
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// Wizard pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardPage {
    FileSelect,
    FileGroups,
    Languages,
    Progress,
    Error,
    Success,
}

/// View state that the enable flags depend on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    /// Source path names an existing spreadsheet
    pub source_valid: bool,
    /// A spreadsheet viewer is registered
    pub viewer_available: bool,
    /// Rows on the FileGroups page; zero skips the page
    pub file_group_rows: usize,
    pub checked_file_groups: usize,
    pub language_rows: usize,
    pub checked_languages: usize,
    /// An import is in flight
    pub busy: bool,
    /// Cancellation was confirmed and the worker has not stopped yet
    pub closing: bool,
}

/// Enable flags of the wizard's controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub next_page: Option<WizardPage>,
    pub previous_page: Option<WizardPage>,
    pub can_open: bool,
    pub can_browse: bool,
    pub can_cancel: bool,
    pub can_finish: bool,
    /// Check actions of the current page's list
    pub bulk: BulkFlags,
    pub closing: bool,
}

impl UiState {
    pub fn can_go_next(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn can_go_back(&self) -> bool {
        self.previous_page.is_some()
    }
}

/// Derive every enable flag from the current page and selections
pub fn derive_ui_state(page: WizardPage, selections: &Selections) -> UiState {
    let has_file_groups = selections.file_group_rows > 0;
    let after_file_select = if has_file_groups {
        WizardPage::FileGroups
    } else {
        WizardPage::Languages
    };
    let before_languages = if has_file_groups {
        WizardPage::FileGroups
    } else {
        WizardPage::FileSelect
    };

    match page {
        WizardPage::FileSelect => UiState {
            next_page: selections.source_valid.then_some(after_file_select),
            can_open: selections.source_valid && selections.viewer_available,
            can_browse: true,
            can_cancel: true,
            ..Default::default()
        },
        WizardPage::FileGroups => UiState {
            next_page: (selections.checked_file_groups > 0).then_some(WizardPage::Languages),
            previous_page: Some(WizardPage::FileSelect),
            can_cancel: true,
            bulk: BulkFlags::for_rows(selections.file_group_rows, selections.checked_file_groups),
            ..Default::default()
        },
        WizardPage::Languages => UiState {
            next_page: (selections.checked_languages > 0).then_some(WizardPage::Progress),
            previous_page: Some(before_languages),
            can_cancel: true,
            bulk: BulkFlags::for_rows(selections.language_rows, selections.checked_languages),
            ..Default::default()
        },
        WizardPage::Progress => UiState {
            can_cancel: selections.busy && !selections.closing,
            closing: selections.closing,
            ..Default::default()
        },
        WizardPage::Error => UiState {
            previous_page: Some(WizardPage::Languages),
            can_cancel: true,
            ..Default::default()
        },
        WizardPage::Success => UiState {
            can_finish: true,
            ..Default::default()
        },
    }
}

/// Whether `path` names an existing file with one of `extensions`
pub fn is_importable_source(path: &str, extensions: &[String]) -> bool {
    let path = path.trim();
    if path.is_empty() {
        return false;
    }
    let path = Path::new(path);
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false);
    supported && path.is_file()
}

/// How the wizard ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    Accepted,
    Cancelled,
}

/// Result of a cancel request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelAction {
    /// The wizard closed
    Closed,
    /// The user must confirm stopping the running import
    NeedsConfirmation,
    /// The running import was asked to stop
    Stopping,
    /// Nothing to cancel
    Ignored,
}

/// Which view of a failure the Error page shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorInspector {
    #[default]
    Message,
    Raw,
    Trace,
}

/// A failure captured for the Error page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// Display form, shown verbatim
    pub message: String,
    /// Debug form
    pub raw: String,
    /// Timestamp, message and source chain
    pub trace: String,
}

impl ErrorReport {
    pub fn from_error(error: &ImportError) -> Self {
        let message = error.to_string();
        let mut trace = format!(
            "[{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            message
        );
        let mut source = error.source();
        let mut depth = 0;
        while let Some(cause) = source {
            if depth == 0 {
                trace.push_str("\n\nCaused by:");
            }
            trace.push_str(&format!("\n  {}: {}", depth, cause));
            depth += 1;
            source = cause.source();
        }

        Self {
            message,
            raw: format!("{:#?}", error),
            trace,
        }
    }
}

/// Import wizard controller
pub struct ImportWizard {
    project: Arc<Project>,
    allowed_groups: Vec<FileGroup>,
    backend: Arc<dyn ImportBackend>,
    viewer: Arc<dyn SpreadsheetViewer>,
    extensions: Vec<String>,
    confirm_cancel: bool,

    page: WizardPage,
    source_path: String,
    source_valid: bool,
    file_groups: CheckList<FileGroup>,
    languages: CheckList<String>,
    saved_file_groups: CheckStates,
    saved_languages: CheckStates,
    /// States of the most recently detected lists; only these are persisted
    recent_file_groups: Option<CheckStates>,
    recent_languages: Option<CheckStates>,

    task: Option<ImportTask>,
    last_request: Option<ImportRequest>,
    confirming_cancel: bool,
    closing: bool,
    progress: Option<String>,
    error: Option<ErrorReport>,
    inspector: ErrorInspector,
    summary: Option<ImportSummary>,
    outcome: Option<WizardOutcome>,
    ui: UiState,
}

impl ImportWizard {
    /// Create a wizard importing into `allowed_groups` of `project`
    pub fn new(
        project: Arc<Project>,
        allowed_groups: Vec<FileGroup>,
        backend: Arc<dyn ImportBackend>,
        viewer: Arc<dyn SpreadsheetViewer>,
    ) -> Self {
        let mut wizard = Self {
            project,
            allowed_groups,
            backend,
            viewer,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            confirm_cancel: true,
            page: WizardPage::FileSelect,
            source_path: String::new(),
            source_valid: false,
            file_groups: CheckList::new(),
            languages: CheckList::new(),
            saved_file_groups: CheckStates::default(),
            saved_languages: CheckStates::default(),
            recent_file_groups: None,
            recent_languages: None,
            task: None,
            last_request: None,
            confirming_cancel: false,
            closing: false,
            progress: None,
            error: None,
            inspector: ErrorInspector::default(),
            summary: None,
            outcome: None,
            ui: UiState::default(),
        };
        wizard.update_ui();
        wizard
    }

    /// Accepted spreadsheet extensions, without the dot
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Whether stopping a running import needs confirmation
    pub fn with_cancel_confirmation(mut self, confirm: bool) -> Self {
        self.confirm_cancel = confirm;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn page(&self) -> WizardPage {
        self.page
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn is_source_valid(&self) -> bool {
        self.source_valid
    }

    pub fn file_groups(&self) -> &CheckList<FileGroup> {
        &self.file_groups
    }

    pub fn languages(&self) -> &CheckList<String> {
        &self.languages
    }

    /// Current progress label; `None` hides it
    pub fn progress_text(&self) -> Option<&str> {
        self.progress.as_deref()
    }

    pub fn error_report(&self) -> Option<&ErrorReport> {
        self.error.as_ref()
    }

    pub fn inspector(&self) -> ErrorInspector {
        self.inspector
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        self.summary.as_ref()
    }

    pub fn outcome(&self) -> Option<WizardOutcome> {
        self.outcome
    }

    /// An import is in flight
    pub fn is_busy(&self) -> bool {
        self.task.is_some()
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn is_confirming_cancel(&self) -> bool {
        self.confirming_cancel
    }

    /// The snapshot handed to the most recent import
    pub fn submitted_request(&self) -> Option<&ImportRequest> {
        self.task
            .as_ref()
            .map(ImportTask::request)
            .or(self.last_request.as_ref())
    }

    fn selections(&self) -> Selections {
        Selections {
            source_valid: self.source_valid,
            viewer_available: self.source_valid && self.viewer.is_available(),
            file_group_rows: self.file_groups.len(),
            checked_file_groups: self.file_groups.checked_count(),
            language_rows: self.languages.len(),
            checked_languages: self.languages.checked_count(),
            busy: self.task.is_some(),
            closing: self.closing,
        }
    }

    /// Change the source path and re-run detection
    pub fn set_source_path(&mut self, path: &str) {
        if self.page != WizardPage::FileSelect {
            return;
        }
        self.source_path = path.to_string();
        self.refresh_detection();
        self.update_ui();
    }

    fn refresh_detection(&mut self) {
        self.remember_states();
        self.file_groups.clear();
        self.languages.clear();

        self.source_valid = is_importable_source(&self.source_path, &self.extensions);
        if !self.source_valid {
            return;
        }

        let path = PathBuf::from(self.source_path.trim());
        debug!(path = %path.display(), "Detecting workbook contents");

        let detected = self
            .backend
            .detect_file_groups(&self.project, &path)
            .unwrap_or_default();
        for group in detected {
            let checksum = group.checksum();
            let Some(allowed) = self
                .allowed_groups
                .iter()
                .find(|g| g.checksum() == checksum)
            else {
                continue;
            };
            if self.file_groups.items().iter().any(|i| i.value == *allowed) {
                continue;
            }
            self.file_groups
                .push(allowed.display_name(), allowed.clone(), true);
        }
        self.file_groups
            .restore_states(&self.saved_file_groups, FileGroup::checksum);

        let codes = self.backend.detect_languages(&path).unwrap_or_default();
        for code in codes {
            let code = code.trim().to_string();
            if !is_valid_culture_name(&code) {
                debug!(%code, "Skipping invalid culture name");
                continue;
            }
            if self
                .languages
                .items()
                .iter()
                .any(|i| i.value.eq_ignore_ascii_case(&code))
            {
                continue;
            }
            self.languages.push(language_label(&code), code, true);
        }
        self.languages
            .restore_states(&self.saved_languages, String::clone);

        info!(
            file_groups = self.file_groups.len(),
            languages = self.languages.len(),
            "Workbook detection finished"
        );
    }

    /// Fold the lists' current states into the saved states
    fn remember_states(&mut self) {
        if !self.file_groups.is_empty() {
            let current = self.file_groups.save_states(FileGroup::checksum);
            self.saved_file_groups.merge(&current);
            self.recent_file_groups = Some(current);
        }
        if !self.languages.is_empty() {
            let current = self.languages.save_states(String::clone);
            self.saved_languages.merge(&current);
            self.recent_languages = Some(current);
        }
    }

    /// Cursor of the checklist on the current page
    pub fn current_list(&mut self) -> Option<&mut dyn Selectable> {
        match self.page {
            WizardPage::FileGroups => Some(&mut self.file_groups),
            WizardPage::Languages => Some(&mut self.languages),
            _ => None,
        }
    }

    /// Apply a check action to the current page's checklist
    pub fn apply(&mut self, action: CheckAction) {
        if !self.ui.bulk.allows(action) {
            return;
        }
        match self.page {
            WizardPage::FileGroups => self.file_groups.apply(action),
            WizardPage::Languages => self.languages.apply(action),
            _ => return,
        }
        self.update_ui();
    }

    /// Advance one page; entering Progress submits the import
    pub fn next(&mut self) {
        let Some(target) = self.ui.next_page else {
            return;
        };
        info!(from = ?self.page, to = ?target, "Wizard next");
        self.page = target;
        if target == WizardPage::Progress {
            self.submit();
        }
        self.update_ui();
    }

    /// Go back one page
    pub fn back(&mut self) {
        let Some(target) = self.ui.previous_page else {
            return;
        };
        info!(from = ?self.page, to = ?target, "Wizard back");
        if self.page == WizardPage::Error {
            self.error = None;
            self.inspector = ErrorInspector::Message;
        }
        self.page = target;
        self.update_ui();
    }

    fn submit(&mut self) {
        if self.task.is_some() {
            warn!("Import already running, ignoring submit");
            return;
        }

        let request = ImportRequest {
            project: Arc::clone(&self.project),
            source_path: PathBuf::from(self.source_path.trim()),
            file_groups: self.file_groups.checked_values(),
            language_codes: self.languages.checked_values(),
        };

        self.progress = None;
        self.summary = None;
        self.error = None;
        self.closing = false;
        self.last_request = Some(request.clone());

        match ImportTask::spawn(Arc::clone(&self.backend), request) {
            Ok(task) => self.task = Some(task),
            Err(e) => {
                warn!(error = %e, "Failed to start import worker");
                self.show_error(&ImportError::Failed(format!(
                    "Failed to start import: {}",
                    e
                )));
            }
        }
    }

    /// Drain worker events; returns true when anything changed
    pub fn poll(&mut self) -> bool {
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        let events = task.poll();
        if events.is_empty() {
            return false;
        }
        let cancel_requested = task.is_cancel_requested();

        for event in events {
            match event {
                WorkerEvent::Progress(text) => {
                    self.progress = (!text.is_empty()).then_some(text);
                }
                WorkerEvent::Finished(result) => {
                    self.task = None;
                    self.closing = false;
                    self.confirming_cancel = false;
                    self.finish_task(result, cancel_requested);
                }
            }
        }
        self.update_ui();
        true
    }

    fn finish_task(
        &mut self,
        result: std::result::Result<ImportSummary, ImportError>,
        cancel_requested: bool,
    ) {
        match result {
            _ if cancel_requested => {
                info!("Import stopped after cancellation");
                self.close_with(WizardOutcome::Cancelled);
            }
            Err(e) if e.is_cancellation() => {
                info!("Import cancelled");
                self.close_with(WizardOutcome::Cancelled);
            }
            Err(e) => {
                warn!(error = %e, "Import failed");
                self.show_error(&e);
            }
            Ok(summary) => {
                info!(?summary, "Import succeeded");
                self.summary = Some(summary);
                self.page = WizardPage::Success;
            }
        }
    }

    fn show_error(&mut self, error: &ImportError) {
        self.error = Some(ErrorReport::from_error(error));
        self.inspector = ErrorInspector::Message;
        self.progress = None;
        self.page = WizardPage::Error;
    }

    fn close_with(&mut self, outcome: WizardOutcome) {
        debug!(?outcome, "Wizard closed");
        self.outcome = Some(outcome);
    }

    /// Cancel button
    pub fn cancel(&mut self) -> CancelAction {
        if !self.ui.can_cancel {
            return CancelAction::Ignored;
        }
        if self.page == WizardPage::Progress {
            if self.confirm_cancel {
                self.confirming_cancel = true;
                return CancelAction::NeedsConfirmation;
            }
            self.stop_import();
            return CancelAction::Stopping;
        }
        self.close_with(WizardOutcome::Cancelled);
        CancelAction::Closed
    }

    /// Answer to the cancel confirmation
    pub fn resolve_cancel(&mut self, confirmed: bool) {
        if !self.confirming_cancel {
            return;
        }
        self.confirming_cancel = false;
        if confirmed {
            self.stop_import();
        }
    }

    fn stop_import(&mut self) {
        if let Some(task) = &self.task {
            info!("Stopping import");
            task.cancel();
            self.closing = true;
            self.update_ui();
        }
    }

    /// Window close request; deferred while an import runs
    pub fn request_close(&mut self) -> bool {
        if self.is_busy() {
            debug!("Close deferred while import runs");
            return false;
        }
        if self.outcome.is_none() {
            let outcome = if self.page == WizardPage::Success {
                WizardOutcome::Accepted
            } else {
                WizardOutcome::Cancelled
            };
            self.close_with(outcome);
        }
        true
    }

    /// Finish button
    pub fn finish(&mut self) {
        if self.ui.can_finish {
            self.close_with(WizardOutcome::Accepted);
        }
    }

    /// Open the source in the external viewer
    pub fn open_source(&self) -> Result<()> {
        if !self.ui.can_open {
            return Err(Error::ViewerLaunch {
                path: PathBuf::from(self.source_path.trim()),
                message: "no spreadsheet viewer available".to_string(),
            });
        }
        self.viewer.open(Path::new(self.source_path.trim()))
    }

    /// Switch the Error page between message, raw error and trace
    pub fn show_inspector(&mut self, inspector: ErrorInspector) {
        if self.page == WizardPage::Error {
            self.inspector = inspector;
        }
    }
}

impl Form for ImportWizard {
    type Model = SettingsStore;

    fn name(&self) -> &'static str {
        "import-wizard"
    }

    fn init_lists(&mut self, _settings: &SettingsStore) {
        self.file_groups.clear();
        self.languages.clear();
        self.page = WizardPage::FileSelect;
    }

    fn model_to_view(&mut self, settings: &SettingsStore) {
        self.saved_file_groups = CheckStates::from_value(settings.get(FILE_GROUPS_KEY));
        self.saved_languages = CheckStates::from_value(settings.get(LANGUAGES_KEY));
        self.recent_file_groups = None;
        self.recent_languages = None;
        self.source_path = settings.get_str(SOURCE_PATH_KEY).unwrap_or_default().to_string();
        self.refresh_detection();
    }

    fn update_ui(&mut self) {
        self.ui = derive_ui_state(self.page, &self.selections());
    }

    fn view_to_model(&mut self, settings: &mut SettingsStore) {
        if self.is_busy() {
            debug!("Import running, settings not saved");
            return;
        }
        self.remember_states();
        // Without a detected list the loaded states are written back unchanged
        let file_groups = self
            .recent_file_groups
            .as_ref()
            .unwrap_or(&self.saved_file_groups);
        let languages = self.recent_languages.as_ref().unwrap_or(&self.saved_languages);
        settings.set(SOURCE_PATH_KEY, self.source_path.trim());
        settings.set(FILE_GROUPS_KEY, file_groups.to_value());
        settings.set(LANGUAGES_KEY, languages.to_value());
        debug!("Import wizard settings stored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FileGroupDetector, ImportContext, ImportProcessor, LanguageDetector};
    use crate::dialogs::lifecycle::open_form;
    use std::fs;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        WaitForCancel,
        SucceedAfterCancel,
        Panic,
    }

    struct FakeBackend {
        groups: Vec<FileGroup>,
        languages: Mutex<Vec<String>>,
        behaviour: Behaviour,
        requests: Mutex<Vec<ImportRequest>>,
    }

    impl FakeBackend {
        fn new(groups: &[&str], languages: &[&str], behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                groups: groups.iter().map(|g| FileGroup::new(*g)).collect(),
                languages: Mutex::new(languages.iter().map(|l| l.to_string()).collect()),
                behaviour,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    impl FileGroupDetector for FakeBackend {
        fn detect_file_groups(&self, _: &Project, _: &Path) -> Option<Vec<FileGroup>> {
            Some(self.groups.clone())
        }
    }

    impl LanguageDetector for FakeBackend {
        fn detect_languages(&self, _: &Path) -> Option<Vec<String>> {
            Some(self.languages.lock().unwrap().clone())
        }
    }

    fn wait_for_cancel(context: &ImportContext) -> bool {
        for _ in 0..1000 {
            if context.is_cancelled() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    impl ImportProcessor for FakeBackend {
        fn process(
            &self,
            request: &ImportRequest,
            context: &ImportContext,
        ) -> std::result::Result<ImportSummary, ImportError> {
            self.requests.lock().unwrap().push(request.clone());
            context.report("Importing");
            match self.behaviour {
                Behaviour::Succeed => Ok(ImportSummary {
                    file_groups: request.file_groups.len(),
                    languages: request.language_codes.len(),
                    entries: 10,
                    files_written: 2,
                }),
                Behaviour::Fail => Err(ImportError::Failed("Sheet 'Menus' is corrupt".into())),
                Behaviour::WaitForCancel => {
                    wait_for_cancel(context);
                    context.check_cancelled()?;
                    Ok(ImportSummary::default())
                }
                Behaviour::SucceedAfterCancel => {
                    wait_for_cancel(context);
                    Ok(ImportSummary::default())
                }
                Behaviour::Panic => panic!("worker exploded"),
            }
        }
    }

    struct FakeViewer(bool);

    impl SpreadsheetViewer for FakeViewer {
        fn is_available(&self) -> bool {
            self.0
        }

        fn open(&self, _: &Path) -> Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        dir: TempDir,
        project: Arc<Project>,
        workbook: String,
    }

    fn fixture(groups: &[&str]) -> Fixture {
        let dir = tempdir().unwrap();
        let mut project = Project::new("Demo", "en", dir.path().join("demo.toml"));
        for group in groups {
            project.file_groups.push(FileGroup::new(*group));
        }
        let workbook = dir.path().join("book.xlsx");
        fs::write(&workbook, b"fake").unwrap();
        Fixture {
            workbook: workbook.display().to_string(),
            project: Arc::new(project),
            dir,
        }
    }

    fn wizard(fx: &Fixture, backend: Arc<FakeBackend>) -> ImportWizard {
        let allowed = fx.project.file_groups.clone();
        let mut wizard = ImportWizard::new(
            Arc::clone(&fx.project),
            allowed,
            backend,
            Arc::new(FakeViewer(true)),
        );
        open_form(&mut wizard, &SettingsStore::new());
        wizard
    }

    fn wait_until_idle(wizard: &mut ImportWizard) {
        for _ in 0..500 {
            wizard.poll();
            if !wizard.is_busy() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("import did not finish");
    }

    fn run_to_progress(wizard: &mut ImportWizard, path: &str) {
        wizard.set_source_path(path);
        while wizard.page() != WizardPage::Progress {
            assert!(wizard.ui_state().can_go_next(), "stuck on {:?}", wizard.page());
            wizard.next();
        }
    }

    #[test]
    fn test_file_select_requires_existing_spreadsheet() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::Succeed));

        let text = fx.dir.path().join("notes.txt");
        fs::write(&text, b"x").unwrap();
        for path in [
            String::new(),
            "   ".to_string(),
            text.display().to_string(),
            fx.dir.path().join("missing.xls").display().to_string(),
        ] {
            w.set_source_path(&path);
            assert!(!w.ui_state().can_go_next(), "{path:?} should not advance");
            assert!(!w.ui_state().can_open);
            assert!(w.file_groups().is_empty());
        }

        let upper = fx.dir.path().join("BOOK.XLS");
        fs::write(&upper, b"x").unwrap();
        w.set_source_path(&format!("  {}  ", upper.display()));
        assert!(w.ui_state().can_go_next());
        assert!(w.ui_state().can_open);
    }

    #[test]
    fn test_open_needs_viewer() {
        let fx = fixture(&["Strings"]);
        let mut w = ImportWizard::new(
            Arc::clone(&fx.project),
            fx.project.file_groups.clone(),
            FakeBackend::new(&["Strings"], &["de"], Behaviour::Succeed),
            Arc::new(FakeViewer(false)),
        );
        open_form(&mut w, &SettingsStore::new());
        w.set_source_path(&fx.workbook);
        assert!(w.ui_state().can_go_next());
        assert!(!w.ui_state().can_open);
        assert!(w.open_source().is_err());
    }

    #[test]
    fn test_no_matching_groups_skips_page_both_ways() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Other"], &["de"], Behaviour::Succeed));
        w.set_source_path(&fx.workbook);
        assert!(w.file_groups().is_empty());

        w.next();
        assert_eq!(w.page(), WizardPage::Languages);
        w.back();
        assert_eq!(w.page(), WizardPage::FileSelect);
    }

    #[test]
    fn test_matching_groups_pass_through_page() {
        let fx = fixture(&["Strings", "Menus"]);
        let mut w = wizard(
            &fx,
            FakeBackend::new(&["strings", "Other"], &["de"], Behaviour::Succeed),
        );
        w.set_source_path(&fx.workbook);
        assert_eq!(w.file_groups().len(), 1);
        assert_eq!(w.file_groups().items()[0].value.name, "Strings");
        assert!(w.file_groups().items()[0].checked);

        w.next();
        assert_eq!(w.page(), WizardPage::FileGroups);
        w.next();
        assert_eq!(w.page(), WizardPage::Languages);
        w.back();
        assert_eq!(w.page(), WizardPage::FileGroups);
        w.back();
        assert_eq!(w.page(), WizardPage::FileSelect);
    }

    #[test]
    fn test_next_needs_a_checked_row() {
        let fx = fixture(&["Strings", "Menus"]);
        let mut w = wizard(
            &fx,
            FakeBackend::new(&["Strings", "Menus"], &["de", "fr"], Behaviour::Succeed),
        );
        w.set_source_path(&fx.workbook);
        w.next();

        w.apply(CheckAction::SelectNone);
        assert!(!w.ui_state().can_go_next());
        w.apply(CheckAction::ToggleCurrent);
        assert!(w.ui_state().can_go_next());
        w.next();

        assert_eq!(w.page(), WizardPage::Languages);
        w.apply(CheckAction::SelectNone);
        assert!(!w.ui_state().can_go_next());
        w.apply(CheckAction::Invert);
        assert_eq!(w.languages().check_states(), vec![true, true]);
        assert!(w.ui_state().can_go_next());
    }

    #[test]
    fn test_languages_filtered_and_labelled() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(
            &fx,
            FakeBackend::new(&["Strings"], &["de-DE", "not a culture", "", "xx-!!"], Behaviour::Succeed),
        );
        w.set_source_path(&fx.workbook);

        let items = w.languages().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value, "de-DE");
        assert_eq!(items[0].label, "German (Germany) (de-DE)");
    }

    #[test]
    fn test_request_is_a_snapshot() {
        let fx = fixture(&["Strings", "Menus"]);
        let backend = FakeBackend::new(&["Strings", "Menus"], &["de", "fr"], Behaviour::WaitForCancel);
        let mut w = wizard(&fx, backend.clone()).with_cancel_confirmation(false);
        w.set_source_path(&fx.workbook);
        w.next();
        w.file_groups.set_checked(1, false);
        w.update_ui();
        w.next();
        w.next();
        assert_eq!(w.page(), WizardPage::Progress);

        let request = w.submitted_request().unwrap().clone();
        assert_eq!(request.file_groups, vec![FileGroup::new("Strings")]);
        assert_eq!(request.language_codes, vec!["de".to_string(), "fr".to_string()]);

        w.languages.select_none();
        w.file_groups.select_all();
        let after = w.submitted_request().unwrap();
        assert_eq!(after.file_groups, request.file_groups);
        assert_eq!(after.language_codes, request.language_codes);

        w.cancel();
        wait_until_idle(&mut w);
        assert_eq!(backend.requests.lock().unwrap()[0].language_codes, request.language_codes);
    }

    #[test]
    fn test_confirmed_cancel_closes_cancelled() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::WaitForCancel));
        run_to_progress(&mut w, &fx.workbook);
        assert!(w.is_busy());

        assert_eq!(w.cancel(), CancelAction::NeedsConfirmation);
        w.resolve_cancel(false);
        assert!(!w.is_closing());
        assert!(w.is_busy());

        assert_eq!(w.cancel(), CancelAction::NeedsConfirmation);
        w.resolve_cancel(true);
        assert!(w.is_closing());
        assert!(w.ui_state().closing);
        assert!(!w.ui_state().can_cancel);
        assert!(!w.request_close());

        wait_until_idle(&mut w);
        assert_eq!(w.outcome(), Some(WizardOutcome::Cancelled));
        assert_ne!(w.page(), WizardPage::Error);
        assert!(w.error_report().is_none());
    }

    #[test]
    fn test_success_after_cancel_counts_as_cancelled() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::SucceedAfterCancel))
            .with_cancel_confirmation(false);
        run_to_progress(&mut w, &fx.workbook);
        w.cancel();
        wait_until_idle(&mut w);
        assert_eq!(w.outcome(), Some(WizardOutcome::Cancelled));
        assert_ne!(w.page(), WizardPage::Success);
    }

    #[test]
    fn test_failure_reaches_error_page_verbatim() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::Fail));
        run_to_progress(&mut w, &fx.workbook);
        wait_until_idle(&mut w);

        assert_eq!(w.page(), WizardPage::Error);
        assert_eq!(w.outcome(), None);
        let report = w.error_report().unwrap();
        assert_eq!(report.message, "Sheet 'Menus' is corrupt");
        assert!(report.trace.contains("Sheet 'Menus' is corrupt"));
        assert!(report.raw.contains("Failed"));

        w.show_inspector(ErrorInspector::Trace);
        assert_eq!(w.inspector(), ErrorInspector::Trace);

        w.back();
        assert_eq!(w.page(), WizardPage::Languages);
        assert!(w.error_report().is_none());
        assert_eq!(w.inspector(), ErrorInspector::Message);
    }

    #[test]
    fn test_panic_reaches_error_page() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::Panic));
        run_to_progress(&mut w, &fx.workbook);
        wait_until_idle(&mut w);

        assert_eq!(w.page(), WizardPage::Error);
        assert!(w.error_report().unwrap().message.contains("worker exploded"));
    }

    #[test]
    fn test_success_then_finish() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::Succeed));
        run_to_progress(&mut w, &fx.workbook);
        wait_until_idle(&mut w);

        assert_eq!(w.page(), WizardPage::Success);
        assert_eq!(w.progress_text(), Some("Importing"));
        assert_eq!(w.summary().unwrap().entries, 10);
        assert!(!w.ui_state().can_go_back());
        assert_eq!(w.cancel(), CancelAction::Ignored);
        w.finish();
        assert_eq!(w.outcome(), Some(WizardOutcome::Accepted));
    }

    #[test]
    fn test_cancel_on_idle_page_closes() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::Succeed));
        assert_eq!(w.cancel(), CancelAction::Closed);
        assert_eq!(w.outcome(), Some(WizardOutcome::Cancelled));
    }

    #[test]
    fn test_reopen_restores_path_and_states() {
        let fx = fixture(&["Strings", "Menus"]);
        let backend = FakeBackend::new(&["Strings", "Menus"], &["de", "fr", "it"], Behaviour::Succeed);
        let mut settings = SettingsStore::new();

        let mut first = wizard(&fx, backend.clone());
        first.set_source_path(&fx.workbook);
        first.file_groups.set_checked(0, false);
        first.languages.set_checked(1, false);
        first.languages.set_checked(2, false);
        first.request_close();
        first.view_to_model(&mut settings);

        let mut second = ImportWizard::new(
            Arc::clone(&fx.project),
            fx.project.file_groups.clone(),
            backend,
            Arc::new(FakeViewer(true)),
        );
        open_form(&mut second, &settings);

        assert_eq!(second.source_path(), fx.workbook);
        assert_eq!(second.file_groups().check_states(), vec![false, true]);
        assert_eq!(second.languages().check_states(), vec![true, false, false]);
        assert_eq!(
            settings.get_str(SOURCE_PATH_KEY),
            Some(fx.workbook.as_str())
        );
    }

    #[test]
    fn test_only_recent_states_are_persisted() {
        let fx = fixture(&["Strings"]);
        let backend = FakeBackend::new(&["Strings"], &["de", "fr"], Behaviour::Succeed);
        let other = fx.dir.path().join("other.xlsx");
        fs::write(&other, b"fake").unwrap();

        let mut w = wizard(&fx, backend.clone());
        w.set_source_path(&fx.workbook);
        w.languages.set_checked(1, false);

        *backend.languages.lock().unwrap() = vec!["it".into(), "ja".into()];
        w.set_source_path(&other.display().to_string());
        w.languages.set_checked(0, false);

        // Switching back within a session still restores the earlier rows
        *backend.languages.lock().unwrap() = vec!["de".into(), "fr".into()];
        w.set_source_path(&fx.workbook);
        assert_eq!(w.languages().check_states(), vec![true, false]);

        let mut settings = SettingsStore::new();
        w.request_close();
        w.view_to_model(&mut settings);

        let saved = CheckStates::from_value(settings.get(LANGUAGES_KEY));
        assert_eq!(saved.checked, vec!["de"]);
        assert_eq!(saved.unchecked, vec!["fr"]);
        assert_eq!(saved.state_of("it"), None);
        assert_eq!(saved.state_of("ja"), None);
    }

    #[test]
    fn test_saved_states_survive_invalid_source() {
        let fx = fixture(&["Strings"]);
        let backend = FakeBackend::new(&["Strings"], &["de", "fr"], Behaviour::Succeed);
        let mut settings = SettingsStore::new();
        settings.set(
            LANGUAGES_KEY,
            CheckStates {
                checked: vec!["de".into()],
                unchecked: vec!["fr".into()],
            }
            .to_value(),
        );

        let mut w = ImportWizard::new(
            Arc::clone(&fx.project),
            fx.project.file_groups.clone(),
            backend,
            Arc::new(FakeViewer(true)),
        );
        open_form(&mut w, &settings);
        w.request_close();
        w.view_to_model(&mut settings);

        let saved = CheckStates::from_value(settings.get(LANGUAGES_KEY));
        assert_eq!(saved.state_of("fr"), Some(false));
        assert_eq!(saved.state_of("de"), Some(true));
    }

    #[test]
    fn test_settings_use_legacy_key_names() {
        let fx = fixture(&["Strings"]);
        let mut settings = SettingsStore::new();
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::Succeed));
        w.set_source_path(&fx.workbook);
        w.request_close();
        w.view_to_model(&mut settings);

        assert_eq!(
            settings.get_str("receiveFileFromTranslator.sourceFilePathTextEdit.Text"),
            Some(fx.workbook.as_str())
        );
        assert!(settings.get("receiveFileFromTranslator.fileGroupsListBox").is_some());
        assert!(
            settings
                .get("receiveFileFromTranslator.languagesToImportCheckListBox")
                .is_some()
        );
    }

    #[test]
    fn test_bulk_actions_enabled_individually() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(
            &fx,
            FakeBackend::new(&["Strings"], &["de", "fr"], Behaviour::Succeed),
        );
        w.set_source_path(&fx.workbook);
        w.next();
        w.next();
        assert_eq!(w.page(), WizardPage::Languages);

        let bulk = w.ui_state().bulk;
        assert!(!bulk.can_select_all);
        assert!(bulk.can_select_none);
        assert!(bulk.can_invert);

        w.apply(CheckAction::SelectAll);
        assert_eq!(w.languages().check_states(), vec![true, true]);

        w.apply(CheckAction::SelectNone);
        let bulk = w.ui_state().bulk;
        assert!(bulk.can_select_all);
        assert!(!bulk.can_select_none);
        assert!(bulk.can_invert);

        w.apply(CheckAction::ToggleCurrent);
        let bulk = w.ui_state().bulk;
        assert!(bulk.can_select_all);
        assert!(bulk.can_select_none);
    }

    #[test]
    fn test_settings_not_saved_while_busy() {
        let fx = fixture(&["Strings"]);
        let mut w = wizard(&fx, FakeBackend::new(&["Strings"], &["de"], Behaviour::WaitForCancel))
            .with_cancel_confirmation(false);
        run_to_progress(&mut w, &fx.workbook);

        let mut settings = SettingsStore::new();
        w.view_to_model(&mut settings);
        assert!(settings.get(SOURCE_PATH_KEY).is_none());

        w.cancel();
        wait_until_idle(&mut w);
    }

    #[test]
    fn test_derive_ui_state_is_pure() {
        let selections = Selections {
            source_valid: true,
            viewer_available: false,
            ..Default::default()
        };
        let ui = derive_ui_state(WizardPage::FileSelect, &selections);
        assert_eq!(ui.next_page, Some(WizardPage::Languages));
        assert!(!ui.can_open);

        let ui = derive_ui_state(WizardPage::Languages, &selections);
        assert_eq!(ui.previous_page, Some(WizardPage::FileSelect));
        assert!(!ui.can_go_next());

        let progress = derive_ui_state(
            WizardPage::Progress,
            &Selections {
                busy: true,
                closing: true,
                ..Default::default()
            },
        );
        assert!(progress.closing);
        assert!(!progress.can_cancel);
        assert!(!progress.can_go_back());
        assert_eq!(progress.bulk, BulkFlags::default());

        let groups = derive_ui_state(
            WizardPage::FileGroups,
            &Selections {
                file_group_rows: 3,
                checked_file_groups: 3,
                ..Default::default()
            },
        );
        assert!(!groups.bulk.can_select_all);
        assert!(groups.bulk.can_select_none);
        assert_eq!(groups.next_page, Some(WizardPage::Languages));
    }
}
