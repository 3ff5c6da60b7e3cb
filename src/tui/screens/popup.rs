//! 弹出层渲染

use crate::tui::browser::{BrowserEntry, FileBrowser};
use crate::tui::components::{centered_rect, render_popup_frame, truncate_value, wrap_lines};
use crate::tui::theme::{HIGHLIGHT_SYMBOL, theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::Line,
    widgets::{List, ListItem, ListState, Paragraph},
};
use rust_i18n::t;

/// 渲染确认弹窗
pub fn draw_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(area, 60, 7);
    let inner = render_popup_frame(&t!("confirm_title"), frame, popup);

    let [message_area, keys_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let lines = wrap_lines(message, message_area.width as usize);
    frame.render_widget(
        Paragraph::new(lines)
            .style(theme().warning())
            .alignment(Alignment::Center),
        message_area,
    );
    frame.render_widget(
        Paragraph::new(t!("confirm_keys"))
            .style(theme().hint())
            .alignment(Alignment::Center),
        keys_area,
    );
}

/// 渲染文件浏览器
pub fn draw_browser(frame: &mut Frame, area: Rect, browser: &FileBrowser) {
    let height = area.height.saturating_sub(4).max(8);
    let popup = centered_rect(area, 80, height);
    let inner = render_popup_frame(&t!("browse_title"), frame, popup);

    let [dir_area, list_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let dir = truncate_value(&browser.dir().display().to_string(), dir_area.width as usize);
    frame.render_widget(Paragraph::new(Line::from(dir)).style(theme().accent()), dir_area);

    let width = (list_area.width as usize).saturating_sub(HIGHLIGHT_SYMBOL.len());
    let mut items: Vec<ListItem> = browser
        .entries()
        .iter()
        .map(|entry| {
            let style = match entry {
                BrowserEntry::File(_) => theme().normal(),
                _ => theme().hint(),
            };
            ListItem::new(truncate_value(&entry.label(), width)).style(style)
        })
        .collect();
    if let Some(error) = browser.error() {
        items.push(ListItem::new(truncate_value(error, width)).style(theme().error()));
    }

    let list = List::new(items)
        .highlight_style(theme().selected())
        .highlight_symbol(HIGHLIGHT_SYMBOL);
    let mut state = ListState::default();
    state.select(browser.selection().list_state.selected());
    frame.render_stateful_widget(list, list_area, &mut state);

    frame.render_widget(
        Paragraph::new(t!("browse_hint"))
            .style(theme().hint())
            .alignment(Alignment::Center),
        hint_area,
    );
}
