//! 列表光标

use ratatui::widgets::ListState;

/// 可选择列表通用行为
pub trait Selectable {
    /// 总选项数
    fn count(&self) -> usize;
    /// 获取列表状态引用
    fn list_state(&self) -> &ListState;
    /// 获取列表状态可变引用
    fn list_state_mut(&mut self) -> &mut ListState;

    /// 选择下一个（循环）
    fn next(&mut self) {
        let count = self.count();
        if count == 0 {
            self.list_state_mut().select(None);
            return;
        }
        let next = match self.list_state().selected() {
            Some(i) => (i + 1) % count,
            None => 0,
        };
        self.list_state_mut().select(Some(next));
    }

    /// 选择上一个（循环）
    fn prev(&mut self) {
        let count = self.count();
        if count == 0 {
            self.list_state_mut().select(None);
            return;
        }
        let prev = match self.list_state().selected() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.list_state_mut().select(Some(prev));
    }

    /// 向下翻页，停在末尾
    fn page_down(&mut self, page: usize) {
        let count = self.count();
        if count == 0 {
            return;
        }
        let current = self.list_state().selected().unwrap_or(0);
        self.list_state_mut()
            .select(Some((current + page.max(1)).min(count - 1)));
    }

    /// 向上翻页，停在开头
    fn page_up(&mut self, page: usize) {
        if self.count() == 0 {
            return;
        }
        let current = self.list_state().selected().unwrap_or(0);
        self.list_state_mut()
            .select(Some(current.saturating_sub(page.max(1))));
    }

    /// 指定索引
    fn select(&mut self, index: usize) {
        let count = self.count();
        if count == 0 {
            self.list_state_mut().select(None);
            return;
        }
        self.list_state_mut().select(Some(index.min(count - 1)));
    }

    /// 列表内容变化后修正光标
    fn clamp_selection(&mut self) {
        let count = self.count();
        let selected = self.list_state().selected();
        match (count, selected) {
            (0, _) => self.list_state_mut().select(None),
            (_, None) => self.list_state_mut().select(Some(0)),
            (_, Some(i)) if i >= count => self.list_state_mut().select(Some(count - 1)),
            _ => {}
        }
    }

    /// 获取当前选中索引
    fn selected(&self) -> Option<usize> {
        self.list_state().selected()
    }
}

/// 纯光标状态，用于没有附加数据的列表
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    /// Ratatui 列表状态
    pub list_state: ListState,
    /// 总选项数
    pub count: usize,
}

impl SelectionState {
    /// 创建选择状态，光标位于首项
    pub fn with_count(count: usize) -> Self {
        let mut state = Self {
            list_state: ListState::default(),
            count,
        };
        state.clamp_selection();
        state
    }

    /// 更新总数并修正光标
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.clamp_selection();
    }
}

impl Selectable for SelectionState {
    fn count(&self) -> usize {
        self.count
    }

    fn list_state(&self) -> &ListState {
        &self.list_state
    }

    fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }
}
