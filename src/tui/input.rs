//! 单行文本输入状态

use unicode_width::UnicodeWidthStr;

/// 文本输入状态，光标以字节偏移记录
#[derive(Debug, Default, Clone)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// 使用初始值创建，光标位于末尾
    pub fn with_value(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.len(),
        }
    }

    /// 替换全部内容
    pub fn set_value(&mut self, value: &str) {
        self.buffer = value.to_string();
        self.cursor = self.buffer.len();
    }

    /// 插入字符
    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// 插入粘贴文本，换行会被丢弃
    pub fn insert_str(&mut self, text: &str) {
        let text: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        self.buffer.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    /// 删除光标前字符
    pub fn delete_before_cursor(&mut self) {
        if let Some(len) = self.prev_char_len() {
            self.cursor -= len;
            self.buffer.remove(self.cursor);
        }
    }

    /// 删除光标后字符
    pub fn delete_after_cursor(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    /// 光标左移
    pub fn move_cursor_left(&mut self) {
        if let Some(len) = self.prev_char_len() {
            self.cursor -= len;
        }
    }

    /// 光标右移
    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// 移动到行首
    pub fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    /// 移动到行尾
    pub fn move_cursor_to_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// 光标可视位置（终端列）
    pub fn visual_cursor_position(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// 获取当前值
    pub fn value(&self) -> &str {
        &self.buffer
    }

    fn prev_char_len(&self) -> Option<usize> {
        self.buffer[..self.cursor].chars().last().map(char::len_utf8)
    }
}
