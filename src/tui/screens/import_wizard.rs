//! 导入向导渲染

use crate::dialogs::{ErrorInspector, ImportWizard, WizardPage};
use crate::tui::browser::FileBrowser;
use crate::tui::components::{
    check_actions_hint, render_checklist, render_hint, render_title_block, three_panel_layout,
    truncate_value, wrap_lines,
};
use crate::tui::input::InputState;
use crate::tui::screens::popup;
use crate::tui::theme::theme;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Wrap},
};
use rust_i18n::t;
use std::borrow::Cow;

/// Host-side state around the wizard controller
#[derive(Debug, Default)]
pub struct ImportScreen {
    /// Source path editor
    pub input: InputState,
    /// Open file browser, if any
    pub browser: Option<FileBrowser>,
    /// One-line notice, e.g. a viewer launch failure
    pub status: Option<String>,
    /// Animation counter for the progress page
    pub ticks: usize,
}

impl ImportScreen {
    pub fn new(source_path: &str) -> Self {
        Self {
            input: InputState::with_value(source_path),
            ..Default::default()
        }
    }
}

fn page_title(page: WizardPage) -> Cow<'static, str> {
    match page {
        WizardPage::FileSelect => t!("wizard_file_select_title"),
        WizardPage::FileGroups => t!("wizard_file_groups_title"),
        WizardPage::Languages => t!("wizard_languages_title"),
        WizardPage::Progress => t!("wizard_progress_title"),
        WizardPage::Error => t!("wizard_error_title"),
        WizardPage::Success => t!("wizard_success_title"),
    }
}

fn page_hint(wizard: &ImportWizard) -> Cow<'static, str> {
    match wizard.page() {
        WizardPage::FileSelect if wizard.ui_state().can_open => t!("file_select_open_hint"),
        WizardPage::FileSelect => t!("file_select_hint"),
        WizardPage::FileGroups | WizardPage::Languages => t!(
            "checklist_hint",
            actions = check_actions_hint(wizard.ui_state().bulk)
        ),
        WizardPage::Progress if wizard.is_closing() => t!("progress_closing_hint"),
        WizardPage::Progress => t!("progress_hint"),
        WizardPage::Error => t!("error_hint"),
        WizardPage::Success => t!("success_hint"),
    }
}

/// 渲染导入向导
pub fn draw(frame: &mut Frame, area: Rect, wizard: &ImportWizard, screen: &ImportScreen) {
    let [header, body, footer] = three_panel_layout(area);

    let title = format!("{} - {}", t!("wizard_title"), page_title(wizard.page()));
    render_title_block(&title, frame, header);

    match wizard.page() {
        WizardPage::FileSelect => draw_file_select(frame, body, wizard, screen),
        WizardPage::FileGroups => render_checklist(
            &t!("file_groups_list"),
            wizard.file_groups(),
            true,
            frame,
            body,
        ),
        WizardPage::Languages => render_checklist(
            &t!("languages_list"),
            wizard.languages(),
            true,
            frame,
            body,
        ),
        WizardPage::Progress => draw_progress(frame, body, wizard, screen),
        WizardPage::Error => draw_error(frame, body, wizard),
        WizardPage::Success => draw_success(frame, body, wizard),
    }

    let hint = match &screen.status {
        Some(status) => Cow::Owned(status.clone()),
        None => page_hint(wizard),
    };
    render_hint(&hint, frame, footer);

    if let Some(browser) = &screen.browser {
        popup::draw_browser(frame, area, browser);
    }
    if wizard.is_confirming_cancel() {
        popup::draw_confirm(frame, area, &t!("confirm_cancel_import"));
    }
}

fn draw_file_select(frame: &mut Frame, area: Rect, wizard: &ImportWizard, screen: &ImportScreen) {
    let [input_area, status_area, detail_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Min(1),
    ])
    .areas(area);

    let border_style = if wizard.is_source_valid() {
        theme().success()
    } else {
        theme().border()
    };
    let input = Paragraph::new(screen.input.value())
        .style(theme().normal())
        .block(
            Block::bordered()
                .title(format!(" {} ", t!("source_file_label")))
                .border_type(BorderType::Rounded)
                .border_style(border_style),
        );
    frame.render_widget(input, input_area);

    if screen.browser.is_none() && !wizard.is_confirming_cancel() {
        let max_x = input_area.x + input_area.width.saturating_sub(2);
        let x = (input_area.x + 1 + screen.input.visual_cursor_position() as u16).min(max_x);
        frame.set_cursor_position(Position::new(x, input_area.y + 1));
    }

    let status = if wizard.source_path().trim().is_empty() {
        Line::from(t!("source_empty")).style(theme().hint())
    } else if wizard.is_source_valid() {
        Line::from(t!("source_valid")).style(theme().success())
    } else {
        Line::from(t!(
            "source_invalid",
            extensions = wizard.extensions().join(", ")
        ))
        .style(theme().warning())
    };
    frame.render_widget(Paragraph::new(status), status_area);

    if wizard.is_source_valid() {
        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{}: ", t!("detected_file_groups")), theme().hint()),
                Span::styled(wizard.file_groups().len().to_string(), theme().accent()),
            ]),
            Line::from(vec![
                Span::styled(format!("{}: ", t!("detected_languages")), theme().hint()),
                Span::styled(wizard.languages().len().to_string(), theme().accent()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), detail_area);
    }
}

fn draw_progress(frame: &mut Frame, area: Rect, wizard: &ImportWizard, screen: &ImportScreen) {
    const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

    let content_width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();

    if wizard.is_closing() {
        lines.push(Line::from(t!("progress_closing")).style(theme().warning()));
    } else if wizard.is_busy() {
        let spinner = SPINNER[screen.ticks % SPINNER.len()];
        lines.push(
            Line::from(format!("{} {}", spinner, t!("progress_running"))).style(theme().accent()),
        );
    }

    if let Some(request) = wizard.submitted_request() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", t!("source_file_label")), theme().hint()),
            Span::raw(truncate_value(
                &request.source_path.display().to_string(),
                content_width.saturating_sub(12),
            )),
        ]));
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", t!("file_groups_list")), theme().hint()),
            Span::raw(request.file_groups.len().to_string()),
        ]));
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", t!("languages_list")), theme().hint()),
            Span::raw(request.language_codes.join(", ")),
        ]));
    }

    if let Some(progress) = wizard.progress_text() {
        lines.push(Line::from(""));
        lines.extend(wrap_lines(progress, content_width));
    }

    let widget = Paragraph::new(lines)
        .style(theme().normal())
        .block(Block::bordered().border_type(BorderType::Rounded))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn draw_error(frame: &mut Frame, area: Rect, wizard: &ImportWizard) {
    let Some(report) = wizard.error_report() else {
        return;
    };

    let (title, text, style) = match wizard.inspector() {
        ErrorInspector::Message => (t!("error_message"), &report.message, theme().error()),
        ErrorInspector::Raw => (t!("error_raw"), &report.raw, theme().normal()),
        ErrorInspector::Trace => (t!("error_trace"), &report.trace, theme().normal()),
    };

    let lines = wrap_lines(text, area.width.saturating_sub(2) as usize);
    let widget = Paragraph::new(lines).style(style).block(
        Block::bordered()
            .title(format!(" {} ", title))
            .border_type(BorderType::Rounded)
            .border_style(theme().error()),
    );
    frame.render_widget(widget, area);
}

fn draw_success(frame: &mut Frame, area: Rect, wizard: &ImportWizard) {
    let mut lines = vec![Line::from(t!("import_complete")).style(theme().success())];

    if let Some(summary) = wizard.summary() {
        lines.push(Line::from(""));
        for (label, value) in [
            (t!("stat_file_groups"), summary.file_groups),
            (t!("stat_languages"), summary.languages),
            (t!("stat_entries"), summary.entries),
            (t!("stat_files_written"), summary.files_written),
        ] {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", label), theme().hint()),
                Span::styled(value.to_string(), theme().accent()),
            ]));
        }
    }

    let widget = Paragraph::new(lines)
        .style(theme().normal())
        .block(Block::bordered().border_type(BorderType::Rounded));
    frame.render_widget(widget, area);
}
