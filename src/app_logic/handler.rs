use super::form_ui_state::{
    AliasModalContext, FormUiState, PendingAction, SelectedFile, history_kind,
};
use super::render;
use super::ui_constants;
use crate::core::backup;
use crate::core::converter_client::DEFAULT_OUTPUT_FILENAME;
use crate::core::history::sorted_by_recency;
use crate::core::identifiers::{
    ValidatedIds, extract_uuids, ids_match, is_uuid, join_tag_ids, parse_tag_ids,
    validate_submission,
};
use crate::core::{
    ClipboardOperations, ConvertError, ConvertRequest, ConverterOperations, DEFAULT_BACKUP_FILENAME,
    HistoryKind, HistoryStoreOperations, SelectionStoreOperations, ValidationError,
};
use crate::platform_layer::types::{ClickRegion, DisplayClickTarget, KeyCode};
use crate::platform_layer::{
    AppEvent, FieldKind, MessageSeverity, PlatformCommand, PlatformEventHandler,
};
use std::collections::VecDeque;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/*
 * The presenter of the conversion form. It processes UI events received from
 * the platform layer, keeps the current account and tag selections in sync
 * with their persisted copies and the identifier history, and enqueues
 * `PlatformCommand`s describing what the user should see. Storage, the
 * conversion endpoint and the clipboard are reached through the core
 * `*Operations` traits so they can be mocked in tests.
 */
pub struct FormLogic {
    history: Arc<dyn HistoryStoreOperations>,
    selection: Arc<dyn SelectionStoreOperations>,
    converter: Arc<dyn ConverterOperations>,
    clipboard: Arc<dyn ClipboardOperations>,
    download_dir: PathBuf,
    // The raw form values, as the submit button would send them.
    pub(crate) account_value: String,
    pub(crate) tags_value: String,
    pub(crate) ui_state: FormUiState,
    synchronous_command_queue: VecDeque<PlatformCommand>,
}

impl FormLogic {
    pub fn new(
        history: Arc<dyn HistoryStoreOperations>,
        selection: Arc<dyn SelectionStoreOperations>,
        converter: Arc<dyn ConverterOperations>,
        clipboard: Arc<dyn ClipboardOperations>,
        download_dir: PathBuf,
    ) -> Self {
        log::debug!("FormLogic: Created with download directory {download_dir:?}.");
        FormLogic {
            history,
            selection,
            converter,
            clipboard,
            download_dir,
            account_value: String::new(),
            tags_value: String::new(),
            ui_state: FormUiState::new(),
            synchronous_command_queue: VecDeque::new(),
        }
    }

    fn enqueue(&mut self, command: PlatformCommand) {
        self.synchronous_command_queue.push_back(command);
    }

    fn set_status(&mut self, text: impl Into<String>, severity: MessageSeverity) {
        self.enqueue(PlatformCommand::SetStatus {
            text: text.into(),
            severity,
        });
    }

    fn app_error(&mut self, text: impl Into<String>) {
        self.set_status(text, MessageSeverity::Error);
    }

    // Storage writes are not fatal: the failure is shown and the form stays usable.
    fn report_write_failure(&mut self, what: &str, err: &dyn Display) {
        log::error!("FormLogic: Failed to save {what}: {err}");
        self.app_error(format!("{}{err}", ui_constants::FAILURE_PREFIX));
    }

    fn current_value(&self, field: FieldKind) -> &str {
        match field {
            FieldKind::Account => &self.account_value,
            FieldKind::Tags => &self.tags_value,
        }
    }

    /*
     * Replaces the current value of a field, persists it and mirrors it into
     * the raw form field. Displays are not re-rendered here.
     */
    fn set_current(&mut self, field: FieldKind, value: String) {
        log::debug!("FormLogic: Current {} set to '{value}'.", field.label());
        let kind = history_kind(field);
        if let Err(e) = self.selection.save_current(kind, &value) {
            self.report_write_failure("current selection", &e);
        }
        match field {
            FieldKind::Account => self.account_value = value.clone(),
            FieldKind::Tags => self.tags_value = value.clone(),
        }
        self.enqueue(PlatformCommand::SetFieldValue { field, text: value });
    }

    // Moves `id` to the front of its history list with a fresh timestamp.
    fn touch_history(&mut self, kind: HistoryKind, id: &str) {
        if let Err(e) = self.history.upsert(kind, id, None, None) {
            self.report_write_failure("history", &e);
        }
    }

    fn selected_tag_ids(&self) -> Vec<String> {
        parse_tag_ids(&self.tags_value)
    }

    fn render_display(&mut self, field: FieldKind) {
        let history = self.history.load(history_kind(field));
        let is_editing = self.ui_state.edit_state(field).is_editing;
        let display = match field {
            FieldKind::Account => {
                render::render_account_display(&self.account_value, &history, is_editing)
            }
            FieldKind::Tags => render::render_tags_display(&self.tags_value, &history, is_editing),
        };
        self.enqueue(PlatformCommand::RenderDisplay { field, display });
    }

    fn render_displays(&mut self) {
        self.render_display(FieldKind::Account);
        self.render_display(FieldKind::Tags);
    }

    fn show_dropdown(&mut self, field: FieldKind) {
        let other = match field {
            FieldKind::Account => FieldKind::Tags,
            FieldKind::Tags => FieldKind::Account,
        };
        if self.ui_state.is_dropdown_open(other) {
            self.enqueue(PlatformCommand::HideDropdown { field: other });
        }
        self.ui_state.open_dropdown = Some(field);
        let kind = history_kind(field);
        let dropdown =
            render::render_dropdown(kind, &self.history.load(kind), &self.selected_tag_ids());
        self.enqueue(PlatformCommand::ShowDropdown { field, dropdown });
    }

    fn refresh_open_dropdown(&mut self) {
        if let Some(field) = self.ui_state.open_dropdown {
            self.show_dropdown(field);
        }
    }

    fn hide_dropdown(&mut self, field: FieldKind) {
        if self.ui_state.is_dropdown_open(field) {
            self.ui_state.open_dropdown = None;
            self.enqueue(PlatformCommand::HideDropdown { field });
        }
    }

    fn hide_dropdowns(&mut self) {
        self.hide_dropdown(FieldKind::Account);
        self.hide_dropdown(FieldKind::Tags);
    }

    fn close_alias_modal(&mut self) {
        if self.ui_state.alias_modal.take().is_some() {
            log::debug!("FormLogic: Alias dialog closed.");
            self.enqueue(PlatformCommand::HideAliasModal);
        }
    }

    fn set_editing(&mut self, field: FieldKind, is_editing: bool) {
        let edit = self.ui_state.edit_state_mut(field);
        edit.is_editing = is_editing;
        edit.text.clear();
    }

    // Loads the saved selections and records UUID-shaped ones in history.
    fn load_saved_selections(&mut self) {
        let account = self.selection.load_current(HistoryKind::Accounts);
        let tags = self.selection.load_current(HistoryKind::Tags);
        log::debug!("FormLogic: Loaded saved account '{account}' and tags '{tags}'.");

        let trimmed_account = account.trim().to_string();
        if is_uuid(&trimmed_account) {
            self.touch_history(HistoryKind::Accounts, &trimmed_account);
        }
        for tag in parse_tag_ids(&tags).iter().filter(|tag| is_uuid(tag)) {
            self.touch_history(HistoryKind::Tags, tag);
        }

        self.account_value = account.clone();
        self.tags_value = tags.clone();
        self.enqueue(PlatformCommand::SetFieldValue {
            field: FieldKind::Account,
            text: account,
        });
        self.enqueue(PlatformCommand::SetFieldValue {
            field: FieldKind::Tags,
            text: tags,
        });
    }

    /*
     * Populates the form: saved selections are restored and seeded into
     * history, the displays are rendered and the submit button is enabled.
     */
    fn on_form_ready(&mut self) {
        log::debug!("FormLogic: Form ready, loading saved state.");
        self.load_saved_selections();
        self.render_displays();
        self.enqueue(PlatformCommand::SetFileLabel {
            text: ui_constants::NO_FILE_LABEL.to_string(),
        });
        self.enqueue(PlatformCommand::SetControlEnabled {
            control_id: ui_constants::SUBMIT_BUTTON_ID,
            enabled: true,
        });
    }

    // Starts over from storage, dropping all transient UI state.
    fn on_reload(&mut self) {
        log::debug!("FormLogic: Reloading the form.");
        self.hide_dropdowns();
        self.close_alias_modal();
        self.ui_state = FormUiState::new();
        self.on_form_ready();
        self.set_status("", MessageSeverity::None);
    }

    fn on_file_chosen(&mut self, path: PathBuf) {
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("FormLogic: Cannot read chosen file {path:?}: {e}");
                self.app_error(format!("{}{e}", ui_constants::FAILURE_PREFIX));
                return;
            }
        };
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = SelectedFile {
            path,
            name,
            size_bytes: metadata.len(),
        };
        log::debug!("FormLogic: Selected file {:?}.", file.path);
        self.enqueue(PlatformCommand::SetFileLabel { text: file.label() });
        self.ui_state.selected_file = Some(file);
    }

    fn on_file_dropped(&mut self, path: PathBuf) {
        let is_csv = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(ui_constants::CSV_SUFFIX));
        if !is_csv {
            log::debug!("FormLogic: Ignoring dropped non-CSV file {path:?}.");
            return;
        }
        self.on_file_chosen(path);
    }

    /*
     * An empty display (and, for tags, the space between chips) switches to
     * free-text editing; anywhere else opens the history dropdown.
     */
    fn on_display_clicked(&mut self, field: FieldKind, target: DisplayClickTarget) {
        let is_empty = match field {
            FieldKind::Account => self.account_value.trim().is_empty(),
            FieldKind::Tags => self.selected_tag_ids().is_empty(),
        };
        let start_editing = is_empty
            || (field == FieldKind::Tags && target == DisplayClickTarget::Background);
        if start_editing {
            log::debug!("FormLogic: {} display entered edit mode.", field.label());
            self.set_editing(field, true);
            self.render_display(field);
        } else {
            self.show_dropdown(field);
        }
    }

    fn on_display_focused(&mut self, field: FieldKind) {
        if !self.ui_state.edit_state(field).is_editing {
            self.show_dropdown(field);
        }
    }

    fn on_display_text_input(&mut self, field: FieldKind, text: &str) {
        if !self.ui_state.edit_state(field).is_editing {
            log::debug!(
                "FormLogic: Ignoring text for {} display outside edit mode.",
                field.label()
            );
            return;
        }
        let edit = self.ui_state.edit_state_mut(field);
        edit.text.push_str(text);
        let typed = edit.text.trim().to_string();
        if typed.is_empty() {
            return;
        }
        let uuids = extract_uuids(&typed);
        match field {
            FieldKind::Account => self.accept_typed_account(&uuids),
            FieldKind::Tags => self.accept_typed_tag(&uuids),
        }
    }

    // The first UUID in the typed text becomes the current account.
    fn accept_typed_account(&mut self, uuids: &[String]) {
        let Some(id) = uuids.first() else {
            return;
        };
        self.set_editing(FieldKind::Account, false);
        self.set_current(FieldKind::Account, id.clone());
        self.touch_history(HistoryKind::Accounts, id);
        self.render_display(FieldKind::Account);
    }

    /*
     * Typing adds one tag at a time. A burst carrying several UUIDs adds
     * nothing and points the user at the dropdown or the paste button.
     */
    fn accept_typed_tag(&mut self, uuids: &[String]) {
        match uuids {
            [] => {}
            [id] => {
                let mut tags = self.selected_tag_ids();
                if !tags.iter().any(|tag| ids_match(tag, id)) {
                    tags.push(id.clone());
                    self.set_current(FieldKind::Tags, join_tag_ids(&tags));
                    self.touch_history(HistoryKind::Tags, id);
                }
                self.set_editing(FieldKind::Tags, false);
                self.render_display(FieldKind::Tags);
            }
            _ => {
                log::warn!(
                    "FormLogic: Rejected typed input with {} tag ids.",
                    uuids.len()
                );
                self.set_editing(FieldKind::Tags, false);
                self.render_display(FieldKind::Tags);
                self.set_status(
                    ui_constants::MSG_ONE_TAG_AT_A_TIME,
                    MessageSeverity::Warning,
                );
            }
        }
    }

    /*
     * Leaving a display ends edit mode. Account text that held no UUID clears
     * the current account; tag text without a UUID is simply discarded.
     */
    fn on_display_blurred(&mut self, field: FieldKind) {
        let edit = self.ui_state.edit_state(field);
        if !edit.is_editing {
            return;
        }
        let typed = edit.text.trim().to_string();
        if field == FieldKind::Account && !typed.is_empty() && extract_uuids(&typed).is_empty() {
            log::debug!("FormLogic: Clearing account after invalid input '{typed}'.");
            self.set_current(FieldKind::Account, String::new());
        }
        self.set_editing(field, false);
        self.render_display(field);
    }

    fn on_display_key_pressed(&mut self, field: FieldKind, key: KeyCode) {
        match key {
            KeyCode::Enter => self.on_display_blurred(field),
            KeyCode::Escape => self.on_key_pressed(key),
        }
    }

    // A direct change of the raw field value.
    fn on_raw_field_changed(&mut self, field: FieldKind, text: &str) {
        let value = text.trim().to_string();
        self.set_current(field, value.clone());
        match field {
            FieldKind::Account => {
                if is_uuid(&value) {
                    self.touch_history(HistoryKind::Accounts, &value);
                }
            }
            FieldKind::Tags => {
                for tag in parse_tag_ids(&value).iter().filter(|tag| is_uuid(tag)) {
                    self.touch_history(HistoryKind::Tags, tag);
                }
            }
        }
        self.render_display(field);
    }

    fn on_chip_remove_clicked(&mut self, field: FieldKind, id: &str) {
        log::debug!("FormLogic: Removing {} chip '{id}'.", field.label());
        let remaining = match field {
            FieldKind::Account => String::new(),
            FieldKind::Tags => {
                let tags: Vec<String> = self
                    .selected_tag_ids()
                    .into_iter()
                    .filter(|tag| !ids_match(tag, id))
                    .collect();
                join_tag_ids(&tags)
            }
        };
        self.set_current(field, remaining);
        self.render_display(field);
        if self.ui_state.is_dropdown_open(field) {
            self.show_dropdown(field);
        }
    }

    fn on_dropdown_row_clicked(&mut self, field: FieldKind, id: &str) {
        match field {
            FieldKind::Account => {
                log::debug!("FormLogic: Account '{id}' selected from history.");
                self.set_current(FieldKind::Account, id.to_string());
                self.touch_history(HistoryKind::Accounts, id);
                self.hide_dropdown(FieldKind::Account);
                self.render_display(FieldKind::Account);
            }
            FieldKind::Tags => {
                let is_selected = self
                    .selected_tag_ids()
                    .iter()
                    .any(|selected| ids_match(selected, id));
                self.on_tag_checkbox_toggled(id, !is_selected);
            }
        }
    }

    /*
     * Recomputes the tag selection from the dropdown's checkboxes, in the
     * order the dropdown lists them, and applies it immediately. Every checked
     * tag gets its recency bumped.
     */
    fn on_tag_checkbox_toggled(&mut self, id: &str, checked: bool) {
        let current = self.selected_tag_ids();
        let is_checked = |entry_id: &str| {
            if ids_match(entry_id, id) {
                checked
            } else {
                current.iter().any(|selected| ids_match(selected, entry_id))
            }
        };
        let history = sorted_by_recency(&self.history.load(HistoryKind::Tags));
        let new_selection: Vec<String> = history
            .into_iter()
            .map(|entry| entry.id)
            .filter(|entry_id| is_checked(entry_id.as_str()))
            .collect();
        log::debug!(
            "FormLogic: Tag '{id}' {}, {} tags selected.",
            if checked { "checked" } else { "unchecked" },
            new_selection.len()
        );

        self.set_current(FieldKind::Tags, join_tag_ids(&new_selection));
        for tag in &new_selection {
            self.touch_history(HistoryKind::Tags, tag);
        }
        self.render_display(FieldKind::Tags);
        if self.ui_state.is_dropdown_open(FieldKind::Tags) {
            self.show_dropdown(FieldKind::Tags);
        }
    }

    fn on_dropdown_edit_clicked(&mut self, field: FieldKind, id: &str) {
        let kind = history_kind(field);
        let initial_text = self
            .history
            .find(kind, id)
            .map(|entry| entry.alias)
            .unwrap_or_default();
        let title = match kind {
            HistoryKind::Accounts => ui_constants::ACCOUNT_ALIAS_TITLE,
            HistoryKind::Tags => ui_constants::TAG_ALIAS_TITLE,
        };
        log::debug!("FormLogic: Editing alias of {kind:?} entry '{id}'.");
        self.ui_state.alias_modal = Some(AliasModalContext {
            kind,
            id: id.to_string(),
        });
        self.enqueue(PlatformCommand::ShowAliasModal {
            title: title.to_string(),
            id: id.to_string(),
            initial_text,
        });
    }

    // The entry leaves history; a selection still holding it keeps the id.
    fn on_dropdown_delete_clicked(&mut self, field: FieldKind, id: &str) {
        let kind = history_kind(field);
        if let Err(e) = self.history.remove(kind, id) {
            self.report_write_failure("history", &e);
        }
        self.render_display(field);
        if self.ui_state.is_dropdown_open(field) {
            self.show_dropdown(field);
        }
    }

    fn on_paste_clicked(&mut self, field: FieldKind) {
        let text = match self.clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                log::warn!("FormLogic: {e}");
                self.app_error(ui_constants::MSG_PASTE_UNAVAILABLE);
                return;
            }
        };
        let uuids = extract_uuids(&text);
        if uuids.is_empty() {
            self.app_error(ui_constants::MSG_PASTE_NO_UUID);
            return;
        }
        self.set_editing(field, false);
        let message = match field {
            FieldKind::Account => {
                let id = &uuids[0];
                self.set_current(FieldKind::Account, id.clone());
                self.touch_history(HistoryKind::Accounts, id);
                ui_constants::MSG_PASTED_ACCOUNT.to_string()
            }
            FieldKind::Tags => {
                self.set_current(FieldKind::Tags, join_tag_ids(&uuids));
                for id in &uuids {
                    self.touch_history(HistoryKind::Tags, id);
                }
                ui_constants::pasted_tags_message(uuids.len())
            }
        };
        self.render_display(field);
        self.show_dropdown(field);
        self.set_status(message, MessageSeverity::Success);
    }

    fn on_alias_save(&mut self, text: &str) {
        let Some(context) = self.ui_state.alias_modal.clone() else {
            log::debug!("FormLogic: Alias save without an open dialog, ignoring.");
            return;
        };
        let alias = text.trim();
        if let Err(e) = self.history.set_alias(context.kind, &context.id, alias) {
            self.report_write_failure("alias", &e);
        }
        self.render_displays();
        self.refresh_open_dropdown();
        self.close_alias_modal();
    }

    fn on_outside_clicked(&mut self, region: ClickRegion) {
        if region != ClickRegion::AccountGroup {
            self.hide_dropdown(FieldKind::Account);
        }
        if region != ClickRegion::TagGroup {
            self.hide_dropdown(FieldKind::Tags);
        }
        if region == ClickRegion::ModalOverlay {
            self.close_alias_modal();
        }
    }

    fn on_key_pressed(&mut self, key: KeyCode) {
        if key == KeyCode::Escape {
            self.hide_dropdowns();
            self.close_alias_modal();
        }
    }

    fn on_export_backup_clicked(&mut self) {
        self.ui_state.pending_action = Some(PendingAction::ExportingBackup);
        self.enqueue(PlatformCommand::ShowSaveFileDialog {
            title: ui_constants::EXPORT_DIALOG_TITLE.to_string(),
            default_filename: DEFAULT_BACKUP_FILENAME.to_string(),
            filter_spec: ui_constants::BACKUP_FILTER_SPEC.to_string(),
        });
    }

    fn on_import_backup_clicked(&mut self) {
        self.ui_state.pending_action = Some(PendingAction::ImportingBackup);
        self.enqueue(PlatformCommand::ShowOpenFileDialog {
            title: ui_constants::IMPORT_DIALOG_TITLE.to_string(),
            filter_spec: ui_constants::BACKUP_FILTER_SPEC.to_string(),
        });
    }

    fn write_backup(&self, path: &Path) -> Result<(), String> {
        let json = backup::export_backup_json(self.history.as_ref(), self.selection.as_ref())
            .map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    fn on_save_dialog_completed(&mut self, result: Option<PathBuf>) {
        if self.ui_state.pending_action != Some(PendingAction::ExportingBackup) {
            log::warn!("FormLogic: Save dialog completed with no export pending.");
            return;
        }
        self.ui_state.pending_action = None;
        let Some(path) = result else {
            log::debug!("FormLogic: Backup export cancelled.");
            return;
        };
        match self.write_backup(&path) {
            Ok(()) => {
                log::debug!("FormLogic: Exported backup to {path:?}.");
                self.set_status(ui_constants::MSG_EXPORT_SUCCESS, MessageSeverity::Success);
            }
            Err(e) => {
                log::error!("FormLogic: Failed to export backup to {path:?}: {e}");
                self.app_error(format!("{}{e}", ui_constants::MSG_EXPORT_FAILED_PREFIX));
            }
        }
    }

    fn read_and_apply_backup(&self, path: &Path) -> Result<backup::AppliedBackup, String> {
        let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
        backup::apply_backup(&text, self.history.as_ref(), self.selection.as_ref())
            .map_err(|e| e.to_string())
    }

    fn on_open_dialog_completed(&mut self, result: Option<PathBuf>) {
        if self.ui_state.pending_action != Some(PendingAction::ImportingBackup) {
            log::warn!("FormLogic: Open dialog completed with no import pending.");
            return;
        }
        self.ui_state.pending_action = None;
        let Some(path) = result else {
            log::debug!("FormLogic: Backup import cancelled.");
            return;
        };
        match self.read_and_apply_backup(&path) {
            Ok(applied) => {
                log::debug!(
                    "FormLogic: Imported {} account and {} tag entries from {path:?}.",
                    applied.account_entries,
                    applied.tag_entries
                );
                if let Some(account) = applied.account_current {
                    self.account_value = account.clone();
                    self.enqueue(PlatformCommand::SetFieldValue {
                        field: FieldKind::Account,
                        text: account,
                    });
                }
                if let Some(tags) = applied.tags_current {
                    self.tags_value = tags.clone();
                    self.enqueue(PlatformCommand::SetFieldValue {
                        field: FieldKind::Tags,
                        text: tags,
                    });
                }
                self.render_displays();
                self.refresh_open_dropdown();
                self.set_status(ui_constants::MSG_IMPORT_SUCCESS, MessageSeverity::Success);
            }
            Err(e) => {
                log::warn!("FormLogic: Failed to import backup from {path:?}: {e}");
                self.app_error(format!("{}{e}", ui_constants::MSG_IMPORT_FAILED_PREFIX));
            }
        }
    }

    // Sends the file and saves the converted result into the download directory.
    fn convert_and_save(
        &self,
        file: &SelectedFile,
        ids: &ValidatedIds,
    ) -> Result<PathBuf, ConvertError> {
        let request = ConvertRequest {
            file_name: file.name.clone(),
            file_bytes: fs::read(&file.path)?,
            account_id: ids.account_id.clone(),
            tag_ids: ids.tag_ids_field(),
        };
        let converted = self.converter.convert(&request)?;
        let filename = Path::new(&converted.filename)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILENAME.into());
        fs::create_dir_all(&self.download_dir)?;
        let output_path = self.download_dir.join(filename);
        fs::write(&output_path, &converted.bytes)?;
        Ok(output_path)
    }

    /*
     * Validates the form, records the identifiers in history, then performs
     * the conversion. The submit button is disabled for the duration of the
     * request and re-enabled whatever the outcome.
     */
    fn on_submit(&mut self) {
        let Some(file) = self.ui_state.selected_file.clone() else {
            self.app_error(ValidationError::MissingAccount.to_string());
            return;
        };
        let ids = match validate_submission(&self.account_value, &self.tags_value) {
            Ok(ids) => ids,
            Err(e) => {
                log::debug!("FormLogic: Submission rejected: {e}");
                self.app_error(e.to_string());
                return;
            }
        };

        self.touch_history(HistoryKind::Accounts, &ids.account_id);
        for tag in &ids.tag_ids {
            self.touch_history(HistoryKind::Tags, tag);
        }

        self.enqueue(PlatformCommand::SetControlEnabled {
            control_id: ui_constants::SUBMIT_BUTTON_ID,
            enabled: false,
        });
        self.set_status(ui_constants::MSG_CONVERTING, MessageSeverity::Information);

        match self.convert_and_save(&file, &ids) {
            Ok(path) => {
                log::info!("FormLogic: Converted '{}' into {path:?}.", file.name);
                self.set_status(ui_constants::MSG_CONVERT_SUCCESS, MessageSeverity::Success);
            }
            Err(e) => {
                log::warn!("FormLogic: Conversion of '{}' failed: {e}", file.name);
                self.app_error(format!("{}{e}", ui_constants::FAILURE_PREFIX));
            }
        }

        self.enqueue(PlatformCommand::SetControlEnabled {
            control_id: ui_constants::SUBMIT_BUTTON_ID,
            enabled: true,
        });
    }

    #[cfg(test)]
    pub(crate) fn test_drain_commands(&mut self) -> Vec<PlatformCommand> {
        self.synchronous_command_queue.drain(..).collect()
    }

    #[cfg(test)]
    pub(crate) fn test_current(&self, field: FieldKind) -> &str {
        self.current_value(field)
    }
}

impl PlatformEventHandler for FormLogic {
    fn handle_event(&mut self, event: AppEvent) {
        log::trace!("FormLogic: Handling {event:?}");
        match event {
            AppEvent::MainWindowUISetupComplete => self.on_form_ready(),
            AppEvent::TitleClicked => self.on_reload(),
            AppEvent::FileChosen { path } => self.on_file_chosen(path),
            AppEvent::FileDropped { path } => self.on_file_dropped(path),
            AppEvent::DisplayClicked { field, target } => self.on_display_clicked(field, target),
            AppEvent::DisplayFocused { field } => self.on_display_focused(field),
            AppEvent::DisplayTextInput { field, text } => self.on_display_text_input(field, &text),
            AppEvent::DisplayBlurred { field } => self.on_display_blurred(field),
            AppEvent::DisplayKeyPressed { field, key } => self.on_display_key_pressed(field, key),
            AppEvent::RawFieldChanged { field, text } => self.on_raw_field_changed(field, &text),
            AppEvent::ChipRemoveClicked { field, id } => self.on_chip_remove_clicked(field, &id),
            AppEvent::DropdownRowClicked { field, id } => self.on_dropdown_row_clicked(field, &id),
            AppEvent::TagCheckboxToggled { id, checked } => {
                self.on_tag_checkbox_toggled(&id, checked)
            }
            AppEvent::DropdownEditClicked { field, id } => self.on_dropdown_edit_clicked(field, &id),
            AppEvent::DropdownDeleteClicked { field, id } => {
                self.on_dropdown_delete_clicked(field, &id)
            }
            AppEvent::PasteClicked { field } => self.on_paste_clicked(field),
            AppEvent::AliasModalSaveClicked { text } => self.on_alias_save(&text),
            AppEvent::AliasModalCancelClicked => self.close_alias_modal(),
            AppEvent::OutsideClicked { region } => self.on_outside_clicked(region),
            AppEvent::KeyPressed { key } => self.on_key_pressed(key),
            AppEvent::ExportBackupClicked => self.on_export_backup_clicked(),
            AppEvent::ImportBackupClicked => self.on_import_backup_clicked(),
            AppEvent::FileSaveDialogCompleted { result } => self.on_save_dialog_completed(result),
            AppEvent::FileOpenDialogCompleted { result } => self.on_open_dialog_completed(result),
            AppEvent::SubmitClicked => self.on_submit(),
            AppEvent::QuitRequested => self.enqueue(PlatformCommand::QuitApplication),
        }
    }

    fn on_quit(&mut self) {
        log::debug!(
            "FormLogic: Quitting with account '{}' and tags '{}'.",
            self.current_value(FieldKind::Account),
            self.current_value(FieldKind::Tags)
        );
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        self.synchronous_command_queue.pop_front()
    }
}
