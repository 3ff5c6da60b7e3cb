//! Common UI components module
//!
//! Provides reusable UI components to avoid code duplication.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, List, ListItem, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::dialogs::{BulkFlags, CheckList, Selectable};
use rust_i18n::t;

use super::theme::{CHECKED_MARK, HIGHLIGHT_SYMBOL, UNCHECKED_MARK, theme};

/// Three-panel layout: header, body, footer
pub fn three_panel_layout(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(2),
    ])
    .areas(area)
}

/// Area of `percent_x`% width and `height` rows centered in `area`
pub fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    rect
}

/// Render a centered title block with border
pub fn render_title_block(title: &str, frame: &mut Frame, area: Rect) {
    let title_line = Line::from(format!(" {} ", title))
        .centered()
        .style(theme().title());

    let block = Block::bordered()
        .title(title_line)
        .border_type(BorderType::Rounded)
        .border_style(theme().border())
        .style(theme().normal());

    frame.render_widget(block, area);
}

/// Render bottom hint text
pub fn render_hint(hint: &str, frame: &mut Frame, area: Rect) {
    let hint_widget = Paragraph::new(hint)
        .style(theme().hint())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(hint_widget, area);
}

/// Key hints of the enabled check actions, each prefixed by ` | `
pub fn check_actions_hint(bulk: BulkFlags) -> String {
    [
        (bulk.can_invert, t!("hint_toggle")),
        (bulk.can_select_all, t!("hint_select_all")),
        (bulk.can_select_none, t!("hint_select_none")),
        (bulk.can_invert, t!("hint_invert")),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, hint)| format!(" | {}", hint))
    .collect()
}

/// Clear `area` and draw a bordered popup frame, returning its inner area
pub fn render_popup_frame(title: &str, frame: &mut Frame, area: Rect) -> Rect {
    let block = Block::bordered()
        .title(Line::from(format!(" {} ", title)).centered().style(theme().title()))
        .border_type(BorderType::Double)
        .border_style(theme().warning())
        .style(theme().normal());
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);
    inner
}

/// Render a checklist with checkbox markers
///
/// A disabled list is drawn dimmed and without a highlighted row.
pub fn render_checklist<T>(
    title: &str,
    list: &CheckList<T>,
    enabled: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let content_width = (area.width as usize)
        .saturating_sub(2 + HIGHLIGHT_SYMBOL.width() + CHECKED_MARK.width());
    let item_style = if enabled {
        theme().normal()
    } else {
        theme().disabled()
    };

    let items: Vec<ListItem> = list
        .items()
        .iter()
        .map(|item| {
            let mark = if item.checked {
                CHECKED_MARK
            } else {
                UNCHECKED_MARK
            };
            let mark_style = if item.checked && enabled {
                theme().success()
            } else {
                item_style
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, mark_style),
                Span::styled(truncate_value(&item.label, content_width), item_style),
            ]))
        })
        .collect();

    let title = format!(" {} ({}/{}) ", title, list.checked_count(), list.len());
    let mut widget = List::new(items).block(
        Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(if enabled {
                theme().border()
            } else {
                theme().disabled()
            }),
    );
    if enabled {
        widget = widget
            .highlight_style(theme().selected())
            .highlight_symbol(HIGHLIGHT_SYMBOL);
    }

    let mut state = ratatui::widgets::ListState::default();
    if enabled {
        state.select(list.selected());
    }
    frame.render_stateful_widget(widget, area, &mut state);
}

/// 按显示宽度截断文本，避免 UTF-8 边界问题
pub fn truncate_value(value: &str, max_width: usize) -> String {
    if value.width() <= max_width {
        return value.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut current_width = 0;
    let mut output = String::new();

    for ch in value.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        output.push(ch);
        current_width += ch_width;
    }

    output.push_str("...");
    output
}

/// 按显示宽度换行
pub fn wrap_lines(value: &str, max_width: usize) -> Vec<Line<'static>> {
    if max_width == 0 {
        return vec![Line::from(String::new())];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in value.chars() {
        if ch == '\n' {
            lines.push(Line::from(current));
            current = String::new();
            current_width = 0;
            continue;
        }

        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width && !current.is_empty() {
            lines.push(Line::from(current));
            current = String::new();
            current_width = 0;
        }

        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(Line::from(current));
    }

    lines
}
