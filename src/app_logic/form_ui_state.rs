/*
 * This module defines the FormUiState struct.
 * FormUiState holds the state that exists only while the form is on screen:
 * which dropdown is open, which chip display is in free-text edit mode, the
 * alias dialog context, the chosen file, and the dialog flow in progress.
 * Persisted values (current selections, history lists) live in the core
 * stores instead.
 */
use crate::core::HistoryKind;
use crate::platform_layer::FieldKind;
use std::path::PathBuf;

// A multi-step action waiting for a file dialog to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingAction {
    ExportingBackup,
    ImportingBackup,
}

// The history entry an open alias dialog edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasModalContext {
    pub kind: HistoryKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
}

impl SelectedFile {
    // "name (12.3 KB)"
    pub fn label(&self) -> String {
        format!("{} ({:.1} KB)", self.name, self.size_bytes as f64 / 1024.0)
    }
}

// Free-text edit state of one chip display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayEditState {
    pub is_editing: bool,
    // Text typed since edit mode was entered.
    pub text: String,
}

#[derive(Debug, Default)]
pub struct FormUiState {
    /* The field whose history dropdown is open. At most one is open at a time. */
    pub open_dropdown: Option<FieldKind>,
    pub account_edit: DisplayEditState,
    pub tags_edit: DisplayEditState,
    /* Set while the alias dialog is shown. */
    pub alias_modal: Option<AliasModalContext>,
    pub selected_file: Option<SelectedFile>,
    pub(crate) pending_action: Option<PendingAction>,
}

impl FormUiState {
    pub fn new() -> Self {
        log::debug!("FormUiState::new called.");
        FormUiState::default()
    }

    pub fn edit_state(&self, field: FieldKind) -> &DisplayEditState {
        match field {
            FieldKind::Account => &self.account_edit,
            FieldKind::Tags => &self.tags_edit,
        }
    }

    pub fn edit_state_mut(&mut self, field: FieldKind) -> &mut DisplayEditState {
        match field {
            FieldKind::Account => &mut self.account_edit,
            FieldKind::Tags => &mut self.tags_edit,
        }
    }

    pub fn is_dropdown_open(&self, field: FieldKind) -> bool {
        self.open_dropdown == Some(field)
    }
}

pub fn history_kind(field: FieldKind) -> HistoryKind {
    match field {
        FieldKind::Account => HistoryKind::Accounts,
        FieldKind::Tags => HistoryKind::Tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_file_label_shows_kilobytes_with_one_decimal() {
        let file = SelectedFile {
            path: PathBuf::from("/tmp/trades.csv"),
            name: "trades.csv".to_string(),
            size_bytes: 12_595,
        };
        assert_eq!(file.label(), "trades.csv (12.3 KB)");
    }

    #[test]
    fn test_edit_state_is_per_field() {
        let mut state = FormUiState::new();
        state.edit_state_mut(FieldKind::Tags).is_editing = true;
        assert!(state.edit_state(FieldKind::Tags).is_editing);
        assert!(!state.edit_state(FieldKind::Account).is_editing);
    }

    #[test]
    fn test_history_kind_per_field() {
        assert_eq!(history_kind(FieldKind::Account), HistoryKind::Accounts);
        assert_eq!(history_kind(FieldKind::Tags), HistoryKind::Tags);
    }
}
