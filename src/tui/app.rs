//! TUI application main module
//!
//! Owns the terminal and runs one dialog at a time. Every loop iteration
//! polls the dialog's background work, redraws, and waits at most one tick
//! for input, so a running import never blocks the UI.

use crate::dialogs::{
    CancelAction, CheckAction, ErrorInspector, ImportWizard, LanguageColumnsDialog, Selectable,
    WizardOutcome, WizardPage,
};
use crate::dialogs::import_wizard::BROWSE_DIRECTORY_KEY;
use crate::project::Project;
use crate::settings::SettingsStore;
use crate::tui::browser::FileBrowser;
use crate::tui::event::{EventPoll, TuiEvent, disable_bracketed_paste, enable_bracketed_paste};
use crate::tui::screens::{self, ImportScreen};
use ratatui::DefaultTerminal;
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rows moved by PageUp/PageDown
const PAGE_SIZE: usize = 10;

/// TUI application
pub struct TuiApp {
    /// Terminal
    terminal: DefaultTerminal,
    /// Event poller
    event_poll: EventPoll,
}

impl TuiApp {
    /// Take over the terminal
    pub fn new(tick_rate: Duration) -> std::io::Result<Self> {
        let terminal = ratatui::try_init()?;
        if let Err(e) = enable_bracketed_paste() {
            debug!(error = %e, "Bracketed paste unavailable");
        }
        Ok(Self {
            terminal,
            event_poll: EventPoll::new(tick_rate),
        })
    }

    /// Run the import wizard until it closes
    ///
    /// `global` provides and records the browse directory.
    pub fn run_import(
        &mut self,
        wizard: &mut ImportWizard,
        global: &mut SettingsStore,
    ) -> std::io::Result<WizardOutcome> {
        let mut screen = ImportScreen::new(wizard.source_path());

        loop {
            if wizard.poll() {
                debug!(page = ?wizard.page(), "Worker update");
            }
            if let Some(outcome) = wizard.outcome() {
                info!(?outcome, "Import wizard finished");
                return Ok(outcome);
            }

            screen.ticks = screen.ticks.wrapping_add(1);
            self.terminal.draw(|frame| {
                let area = frame.area();
                screens::import_wizard::draw(frame, area, wizard, &screen)
            })?;

            match self.event_poll.next() {
                TuiEvent::None | TuiEvent::Resize(_, _) => {}
                event => handle_import_event(wizard, &mut screen, global, event),
            }
        }
    }

    /// Run the language-columns dialog; returns whether it was accepted
    pub fn run_columns(
        &mut self,
        dialog: &mut LanguageColumnsDialog,
        project: &mut Project,
    ) -> std::io::Result<bool> {
        loop {
            let name = project.name.clone();
            self.terminal.draw(|frame| {
                let area = frame.area();
                screens::language_columns::draw(frame, area, dialog, &name)
            })?;

            match self.event_poll.next() {
                TuiEvent::Escape | TuiEvent::CtrlC => {
                    info!("Language columns dialog cancelled");
                    return Ok(false);
                }
                TuiEvent::Enter => {
                    if dialog.accept(project) {
                        return Ok(true);
                    }
                }
                TuiEvent::Tab | TuiEvent::Char('m') => dialog.toggle_mode(),
                event => handle_checklist_keys(event, dialog.ui_state().checklist_enabled, |action| {
                    match action {
                        ListKey::Move(movement) => movement.apply(dialog.languages_mut()),
                        ListKey::Check(action) => dialog.apply(action),
                    }
                }),
            }
        }
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        let _ = disable_bracketed_paste();
        ratatui::restore();
    }
}

/// Cursor movement on a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Movement {
    Next,
    Prev,
    PageDown,
    PageUp,
}

impl Movement {
    fn apply(self, list: &mut dyn Selectable) {
        match self {
            Movement::Next => list.next(),
            Movement::Prev => list.prev(),
            Movement::PageDown => list.page_down(PAGE_SIZE),
            Movement::PageUp => list.page_up(PAGE_SIZE),
        }
    }
}

/// Key meaning on a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKey {
    Move(Movement),
    Check(CheckAction),
}

fn list_key(event: &TuiEvent) -> Option<ListKey> {
    let key = match event {
        TuiEvent::Down => ListKey::Move(Movement::Next),
        TuiEvent::Up => ListKey::Move(Movement::Prev),
        TuiEvent::PageDown => ListKey::Move(Movement::PageDown),
        TuiEvent::PageUp => ListKey::Move(Movement::PageUp),
        TuiEvent::Space => ListKey::Check(CheckAction::ToggleCurrent),
        TuiEvent::Char('a') => ListKey::Check(CheckAction::SelectAll),
        TuiEvent::Char('n') => ListKey::Check(CheckAction::SelectNone),
        TuiEvent::Char('i') => ListKey::Check(CheckAction::Invert),
        _ => return None,
    };
    Some(key)
}

fn handle_checklist_keys(event: TuiEvent, enabled: bool, apply: impl FnOnce(ListKey)) {
    if !enabled {
        return;
    }
    if let Some(key) = list_key(&event) {
        apply(key);
    }
}

fn handle_import_event(
    wizard: &mut ImportWizard,
    screen: &mut ImportScreen,
    global: &mut SettingsStore,
    event: TuiEvent,
) {
    if event != TuiEvent::None {
        screen.status = None;
    }

    if event == TuiEvent::CtrlC {
        if !wizard.request_close() {
            screen.status = Some(t!("close_deferred").to_string());
        }
        return;
    }

    if wizard.is_confirming_cancel() {
        match event {
            TuiEvent::Char('y') | TuiEvent::Char('Y') => wizard.resolve_cancel(true),
            TuiEvent::Char('n') | TuiEvent::Char('N') | TuiEvent::Escape => {
                wizard.resolve_cancel(false)
            }
            _ => {}
        }
        return;
    }

    if screen.browser.is_some() {
        handle_browser(wizard, screen, global, event);
        return;
    }

    if event == TuiEvent::Escape {
        if wizard.cancel() == CancelAction::Closed {
            info!("Import wizard cancelled by user");
        }
        return;
    }

    match wizard.page() {
        WizardPage::FileSelect => handle_file_select(wizard, screen, global, event),
        WizardPage::FileGroups | WizardPage::Languages => match event {
            TuiEvent::Enter | TuiEvent::Right => wizard.next(),
            TuiEvent::Backspace | TuiEvent::Left => wizard.back(),
            event => handle_checklist_keys(event, true, |key| match key {
                ListKey::Move(movement) => {
                    if let Some(list) = wizard.current_list() {
                        movement.apply(list);
                    }
                }
                ListKey::Check(action) => wizard.apply(action),
            }),
        },
        WizardPage::Progress => {}
        WizardPage::Error => match event {
            TuiEvent::Backspace | TuiEvent::Left => wizard.back(),
            TuiEvent::Char('m') => wizard.show_inspector(ErrorInspector::Message),
            TuiEvent::Char('r') => wizard.show_inspector(ErrorInspector::Raw),
            TuiEvent::Char('t') => wizard.show_inspector(ErrorInspector::Trace),
            _ => {}
        },
        WizardPage::Success => {
            if event == TuiEvent::Enter {
                wizard.finish();
            }
        }
    }
}

fn handle_file_select(
    wizard: &mut ImportWizard,
    screen: &mut ImportScreen,
    global: &SettingsStore,
    event: TuiEvent,
) {
    let edited = match event {
        TuiEvent::Enter => {
            wizard.next();
            false
        }
        TuiEvent::Ctrl('o') => {
            if let Err(e) = wizard.open_source() {
                warn!(error = %e, "Failed to open spreadsheet");
                screen.status = Some(e.to_string());
            }
            false
        }
        TuiEvent::Ctrl('f') => {
            let dir = browse_start_dir(wizard, global);
            screen.browser = Some(FileBrowser::open(&dir, wizard.extensions()));
            false
        }
        TuiEvent::Char(c) => {
            screen.input.insert_char(c);
            true
        }
        TuiEvent::Space => {
            screen.input.insert_char(' ');
            true
        }
        TuiEvent::Paste(text) => {
            screen.input.insert_str(&text);
            true
        }
        TuiEvent::Backspace => {
            screen.input.delete_before_cursor();
            true
        }
        TuiEvent::Delete => {
            screen.input.delete_after_cursor();
            true
        }
        TuiEvent::Left => {
            screen.input.move_cursor_left();
            false
        }
        TuiEvent::Right => {
            screen.input.move_cursor_right();
            false
        }
        TuiEvent::Home => {
            screen.input.move_cursor_to_start();
            false
        }
        TuiEvent::End => {
            screen.input.move_cursor_to_end();
            false
        }
        _ => false,
    };

    if edited {
        wizard.set_source_path(screen.input.value());
    }
}

fn handle_browser(
    wizard: &mut ImportWizard,
    screen: &mut ImportScreen,
    global: &mut SettingsStore,
    event: TuiEvent,
) {
    let Some(browser) = screen.browser.as_mut() else {
        return;
    };

    match event {
        TuiEvent::Escape => screen.browser = None,
        TuiEvent::Backspace | TuiEvent::Left => browser.go_up(),
        TuiEvent::Down => browser.selection_mut().next(),
        TuiEvent::Up => browser.selection_mut().prev(),
        TuiEvent::PageDown => browser.selection_mut().page_down(PAGE_SIZE),
        TuiEvent::PageUp => browser.selection_mut().page_up(PAGE_SIZE),
        TuiEvent::Enter | TuiEvent::Right => {
            if let Some(path) = browser.activate() {
                choose_file(wizard, screen, global, &path);
            }
        }
        _ => {}
    }
}

fn choose_file(
    wizard: &mut ImportWizard,
    screen: &mut ImportScreen,
    global: &mut SettingsStore,
    path: &Path,
) {
    info!(path = %path.display(), "File chosen in browser");
    if let Some(dir) = path.parent() {
        global.set(BROWSE_DIRECTORY_KEY, dir.display().to_string());
    }
    let value = path.display().to_string();
    screen.input.set_value(&value);
    screen.browser = None;
    wizard.set_source_path(&value);
}

/// Last browse directory, else the current source's directory, else the
/// project directory
fn browse_start_dir(wizard: &ImportWizard, global: &SettingsStore) -> PathBuf {
    if let Some(dir) = global
        .get_str(BROWSE_DIRECTORY_KEY)
        .map(PathBuf::from)
        .filter(|d| d.is_dir())
    {
        return dir;
    }

    let source = PathBuf::from(wizard.source_path().trim());
    if let Some(dir) = source.parent().filter(|d| d.is_dir() && !d.as_os_str().is_empty()) {
        return dir.to_path_buf();
    }

    wizard.project().base_dir()
}
