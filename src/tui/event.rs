//! Event handling module
//!
//! Uses crossterm for terminal event handling.

use crossterm::{
    ExecutableCommand,
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
};
use std::time::Duration;

/// Default event poll interval (milliseconds)
pub const TICK_RATE: u64 = 50;

/// Event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Tab key
    Tab,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Space bar
    Space,
    /// Character input
    Char(char),
    /// Ctrl + character, other than the exit combinations
    Ctrl(char),
    /// Ctrl+C / Ctrl+D
    CtrlC,
    /// Bracketed paste
    Paste(String),
    /// Window resize
    Resize(u16, u16),
    /// Home key
    Home,
    /// End key
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// No event (timeout)
    None,
}

impl From<Event> for TuiEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key_event) => key_event.into(),
            Event::Resize(width, height) => TuiEvent::Resize(width, height),
            Event::Paste(text) => TuiEvent::Paste(text),
            Event::Mouse(_) => TuiEvent::None,
            Event::FocusGained => TuiEvent::None,
            Event::FocusLost => TuiEvent::None,
        }
    }
}

impl From<KeyEvent> for TuiEvent {
    fn from(key: KeyEvent) -> Self {
        // Ignore non-press events
        if key.kind != KeyEventKind::Press {
            return TuiEvent::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => TuiEvent::CtrlC,
                KeyCode::Char(c) => TuiEvent::Ctrl(c.to_ascii_lowercase()),
                _ => TuiEvent::None,
            };
        }

        match key.code {
            KeyCode::Esc => TuiEvent::Escape,
            KeyCode::Enter => TuiEvent::Enter,
            KeyCode::Up => TuiEvent::Up,
            KeyCode::Down => TuiEvent::Down,
            KeyCode::Left => TuiEvent::Left,
            KeyCode::Right => TuiEvent::Right,
            KeyCode::Tab => TuiEvent::Tab,
            KeyCode::Backspace => TuiEvent::Backspace,
            KeyCode::Delete => TuiEvent::Delete,
            KeyCode::Char(' ') => TuiEvent::Space,
            KeyCode::Char(c) => TuiEvent::Char(c),
            KeyCode::Home => TuiEvent::Home,
            KeyCode::End => TuiEvent::End,
            KeyCode::PageUp => TuiEvent::PageUp,
            KeyCode::PageDown => TuiEvent::PageDown,
            _ => TuiEvent::None,
        }
    }
}

/// Event poller
#[derive(Debug)]
pub struct EventPoll {
    tick_rate: Duration,
}

impl EventPoll {
    /// Create new event poller
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Poll next event, returning `None` after one tick without input
    pub fn next(&self) -> TuiEvent {
        if event::poll(self.tick_rate).unwrap_or(false) {
            event::read().map(TuiEvent::from).unwrap_or(TuiEvent::None)
        } else {
            TuiEvent::None
        }
    }
}

impl Default for EventPoll {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE))
    }
}

/// Enable bracketed paste mode
pub fn enable_bracketed_paste() -> std::io::Result<()> {
    std::io::stdout().execute(EnableBracketedPaste)?;
    Ok(())
}

/// Disable bracketed paste mode
pub fn disable_bracketed_paste() -> std::io::Result<()> {
    std::io::stdout().execute(DisableBracketedPaste)?;
    Ok(())
}
