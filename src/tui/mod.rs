//! Ratatui 终端 UI 模块
//!
//! 提供基于 ratatui 的终端用户界面：导入向导与语言列对话框的渲染和按键处理。

pub mod app;
pub mod browser;
pub mod components;
pub mod event;
pub mod input;
pub mod screens;
pub mod theme;

pub use app::TuiApp;
pub use browser::{BrowserEntry, FileBrowser};
pub use event::{EventPoll, TuiEvent};
pub use input::InputState;
pub use screens::ImportScreen;
pub use theme::{Theme, theme};
