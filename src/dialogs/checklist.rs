//! Checklist view model
//!
//! Every row pairs a derived label with one canonical value. Check-states
//! are persisted by a string key computed from the value, never by label.

use crate::dialogs::selection::Selectable;
use ratatui::widgets::ListState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A checklist row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckItem<T> {
    pub label: String,
    pub value: T,
    pub checked: bool,
}

/// Bulk and single-row actions on a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckAction {
    SelectAll,
    SelectNone,
    Invert,
    /// Toggle the row under the cursor
    ToggleCurrent,
}

/// Which check actions currently change anything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkFlags {
    /// Some row is unchecked
    pub can_select_all: bool,
    /// Some row is checked
    pub can_select_none: bool,
    /// The list has rows
    pub can_invert: bool,
}

impl BulkFlags {
    pub fn for_rows(rows: usize, checked: usize) -> Self {
        Self {
            can_select_all: checked < rows,
            can_select_none: checked > 0,
            can_invert: rows > 0,
        }
    }

    /// Whether `action` is enabled; toggling needs a row like inverting
    pub fn allows(&self, action: CheckAction) -> bool {
        match action {
            CheckAction::SelectAll => self.can_select_all,
            CheckAction::SelectNone => self.can_select_none,
            CheckAction::Invert | CheckAction::ToggleCurrent => self.can_invert,
        }
    }
}

/// Saved check-states, keyed by canonical value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStates {
    #[serde(default)]
    pub checked: Vec<String>,
    #[serde(default)]
    pub unchecked: Vec<String>,
}

impl CheckStates {
    /// Read states from a settings value; anything malformed yields no states
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "checked": self.checked,
            "unchecked": self.unchecked,
        })
    }

    /// Saved state for `key`, if any
    pub fn state_of(&self, key: &str) -> Option<bool> {
        if self.checked.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            Some(true)
        } else if self.unchecked.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            Some(false)
        } else {
            None
        }
    }

    /// Overlay `newer` on top of these states
    pub fn merge(&mut self, newer: &CheckStates) {
        let newer_keys = newer.checked.iter().chain(newer.unchecked.iter());
        let overridden: Vec<String> = newer_keys.cloned().collect();
        let keep = |k: &String| !overridden.iter().any(|o| o.eq_ignore_ascii_case(k));
        self.checked.retain(keep);
        self.unchecked.retain(keep);
        self.checked.extend(newer.checked.iter().cloned());
        self.unchecked.extend(newer.unchecked.iter().cloned());
    }
}

/// Checklist with a cursor
#[derive(Debug, Clone)]
pub struct CheckList<T> {
    items: Vec<CheckItem<T>>,
    list_state: ListState,
}

impl<T> Default for CheckList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CheckList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            list_state: ListState::default(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: T, checked: bool) {
        self.items.push(CheckItem {
            label: label.into(),
            value,
            checked,
        });
        self.clamp_selection();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.list_state.select(None);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CheckItem<T>] {
        &self.items
    }

    /// Sort rows by label, ignoring case
    pub fn sort_by_label(&mut self) {
        self.items
            .sort_by_key(|item| item.label.to_lowercase());
    }

    pub fn set_checked(&mut self, index: usize, checked: bool) {
        if let Some(item) = self.items.get_mut(index) {
            item.checked = checked;
        }
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.checked = !item.checked;
        }
    }

    pub fn select_all(&mut self) {
        self.items.iter_mut().for_each(|item| item.checked = true);
    }

    pub fn select_none(&mut self) {
        self.items.iter_mut().for_each(|item| item.checked = false);
    }

    pub fn invert(&mut self) {
        self.items
            .iter_mut()
            .for_each(|item| item.checked = !item.checked);
    }

    pub fn apply(&mut self, action: CheckAction) {
        match action {
            CheckAction::SelectAll => self.select_all(),
            CheckAction::SelectNone => self.select_none(),
            CheckAction::Invert => self.invert(),
            CheckAction::ToggleCurrent => {
                if let Some(index) = self.list_state.selected() {
                    self.toggle(index);
                }
            }
        }
    }

    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|item| item.checked).count()
    }

    pub fn bulk_flags(&self) -> BulkFlags {
        BulkFlags::for_rows(self.len(), self.checked_count())
    }

    /// Check flags in row order
    pub fn check_states(&self) -> Vec<bool> {
        self.items.iter().map(|item| item.checked).collect()
    }

    /// Values of the checked rows, in row order
    pub fn checked_values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items
            .iter()
            .filter(|item| item.checked)
            .map(|item| item.value.clone())
            .collect()
    }

    /// Current states keyed by `key`
    pub fn save_states(&self, key: impl Fn(&T) -> String) -> CheckStates {
        let mut states = CheckStates::default();
        for item in &self.items {
            let k = key(&item.value);
            if item.checked {
                states.checked.push(k);
            } else {
                states.unchecked.push(k);
            }
        }
        states
    }

    /// Apply saved states; rows without a saved state keep their default
    pub fn restore_states(&mut self, states: &CheckStates, key: impl Fn(&T) -> String) {
        for item in &mut self.items {
            if let Some(checked) = states.state_of(&key(&item.value)) {
                item.checked = checked;
            }
        }
    }
}

impl<T> Selectable for CheckList<T> {
    fn count(&self) -> usize {
        self.items.len()
    }

    fn list_state(&self) -> &ListState {
        &self.list_state
    }

    fn list_state_mut(&mut self) -> &mut ListState {
        &mut self.list_state
    }
}
