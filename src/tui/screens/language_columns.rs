//! 语言列配置渲染

use crate::dialogs::{DisplayMode, LanguageColumnsDialog};
use crate::tui::components::{
    check_actions_hint, render_checklist, render_hint, render_title_block, three_panel_layout,
};
use crate::tui::theme::theme;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};
use rust_i18n::t;

/// 渲染语言列配置对话框
pub fn draw(frame: &mut Frame, area: Rect, dialog: &LanguageColumnsDialog, project_name: &str) {
    let [header, body, footer] = three_panel_layout(area);

    let title = format!("{} - {}", t!("columns_title"), project_name);
    render_title_block(&title, frame, header);

    let [mode_area, list_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Min(1)]).areas(body);

    let radio = |mode: DisplayMode, label: String| {
        let selected = dialog.mode() == mode;
        let mark = if selected { "(•) " } else { "( ) " };
        let style = if selected {
            theme().accent()
        } else {
            theme().normal()
        };
        Line::from(vec![Span::styled(mark, style), Span::styled(label, style)])
    };
    let modes = Paragraph::new(vec![
        radio(DisplayMode::All, t!("columns_mode_all").to_string()),
        radio(DisplayMode::Subset, t!("columns_mode_subset").to_string()),
    ])
    .block(
        Block::bordered()
            .title(format!(" {} ", t!("columns_mode")))
            .border_type(BorderType::Rounded)
            .border_style(theme().border()),
    );
    frame.render_widget(modes, mode_area);

    render_checklist(
        &t!("languages_list"),
        dialog.languages(),
        dialog.ui_state().checklist_enabled,
        frame,
        list_area,
    );

    let hint = if dialog.ui_state().can_accept {
        t!("columns_hint", actions = check_actions_hint(dialog.ui_state().bulk))
    } else {
        t!("columns_hint_need_selection")
    };
    render_hint(&hint, frame, footer);
}
