//! 主题模块
//!
//! 提供统一的主题定义。

use ratatui::style::{Color, Modifier, Style};

/// 列表高亮符号
pub const HIGHLIGHT_SYMBOL: &str = "▶ ";
/// 复选框：已选中
pub const CHECKED_MARK: &str = "[x] ";
/// 复选框：未选中
pub const UNCHECKED_MARK: &str = "[ ] ";

/// 主题颜色配置
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// 背景色（深色主题）
    pub bg: Color,
    /// 前景色（白色）
    pub fg: Color,
    /// 强调色（青色）
    pub accent: Color,
    /// 选中项背景色
    pub selected_bg: Color,
    /// 选中项前景色
    pub selected_fg: Color,
    /// 成功色（绿色）
    pub success: Color,
    /// 警告色（黄色）
    pub warning: Color,
    /// 错误色（红色）
    pub error: Color,
    /// 提示/次要文字色（灰色）
    pub hint: Color,
    /// 禁用控件颜色
    pub disabled: Color,
    /// 边框色
    pub border: Color,
    /// 标题颜色
    pub title: Color,
}

impl Theme {
    /// 普通文本样式
    pub fn normal(&self) -> Style {
        Style::new().fg(self.fg).bg(self.bg)
    }

    /// 标题样式
    pub fn title(&self) -> Style {
        Style::new()
            .fg(self.title)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    /// 选中项样式
    pub fn selected(&self) -> Style {
        Style::new()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// 强调样式
    pub fn accent(&self) -> Style {
        Style::new().fg(self.accent).bg(self.bg)
    }

    /// 边框样式
    pub fn border(&self) -> Style {
        Style::new().fg(self.border).bg(self.bg)
    }

    /// 提示文本样式
    pub fn hint(&self) -> Style {
        Style::new().fg(self.hint).bg(self.bg)
    }

    /// 禁用样式
    pub fn disabled(&self) -> Style {
        Style::new()
            .fg(self.disabled)
            .bg(self.bg)
            .add_modifier(Modifier::DIM)
    }

    /// 成功样式
    pub fn success(&self) -> Style {
        Style::new().fg(self.success).bg(self.bg)
    }

    /// 警告样式
    pub fn warning(&self) -> Style {
        Style::new().fg(self.warning).bg(self.bg)
    }

    /// 错误样式
    pub fn error(&self) -> Style {
        Style::new().fg(self.error).bg(self.bg)
    }
}

/// 全局主题实例
pub static THEME: Theme = Theme {
    bg: Color::Black,
    fg: Color::White,
    accent: Color::Cyan,
    selected_bg: Color::Cyan,
    selected_fg: Color::Black,
    success: Color::Green,
    warning: Color::Yellow,
    error: Color::Red,
    hint: Color::Gray,
    disabled: Color::DarkGray,
    border: Color::Cyan,
    title: Color::Cyan,
};

/// 获取全局主题引用
pub fn theme() -> &'static Theme {
    &THEME
}
