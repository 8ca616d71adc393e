/*
 * Defines shared constants for the form: logical identifiers of controls that
 * the presenter enables or disables, and the user-facing texts it shows in
 * the status line, the alias dialog and the history dropdowns. The
 * `platform_layer` maps control identifiers to whatever native element
 * represents them.
 */

use crate::platform_layer::ControlId;

// Logical ID for the "Convert" button.
pub const SUBMIT_BUTTON_ID: ControlId = ControlId::new(1001);

// --- Status messages ---
pub const MSG_CONVERTING: &str = "Converting... This may take a moment.";
pub const MSG_CONVERT_SUCCESS: &str = "✓ Conversion successful! File downloaded.";
pub const FAILURE_PREFIX: &str = "✗ ";

pub const MSG_PASTE_NO_UUID: &str = "Nothing to paste: clipboard does not contain a UUID.";
pub const MSG_PASTE_UNAVAILABLE: &str =
    "✗ Could not read clipboard (requires permission or a desktop session).";
pub const MSG_PASTED_ACCOUNT: &str = "✓ Pasted Account ID from clipboard.";
pub const MSG_ONE_TAG_AT_A_TIME: &str = "⚠️ Only one tag at a time. Use the dropdown to select multiple tags, or paste via the paste button.";

pub const MSG_EXPORT_SUCCESS: &str = "✓ Exported IDs backup.";
pub const MSG_EXPORT_FAILED_PREFIX: &str = "✗ Failed to export backup: ";
pub const MSG_IMPORT_SUCCESS: &str = "✓ Imported backup successfully.";
pub const MSG_IMPORT_FAILED_PREFIX: &str = "✗ Failed to import backup: ";

// --- Alias dialog ---
pub const ACCOUNT_ALIAS_TITLE: &str = "Account alias";
pub const TAG_ALIAS_TITLE: &str = "Tag set alias";

// --- Dropdowns ---
pub const ACCOUNT_DROPDOWN_EMPTY_TEXT: &str = "No history yet";
pub const TAGS_DROPDOWN_EMPTY_TEXT: &str = "No tags yet";

// --- File selection ---
pub const NO_FILE_LABEL: &str = "No file chosen";
pub const CSV_SUFFIX: &str = ".csv";

// --- Dialogs ---
pub const EXPORT_DIALOG_TITLE: &str = "Save IDs backup";
pub const IMPORT_DIALOG_TITLE: &str = "Import IDs backup";
pub const BACKUP_FILTER_SPEC: &str = "JSON files (*.json)";

pub fn pasted_tags_message(count: usize) -> String {
    let noun = if count == 1 { "Tag ID" } else { "Tag IDs" };
    format!("✓ Pasted {count} {noun} from clipboard.")
}
