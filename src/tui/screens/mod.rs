//! 屏幕渲染模块

pub mod import_wizard;
pub mod language_columns;
pub mod popup;

pub use import_wizard::ImportScreen;
