/*
 * Export and import of the portable backup document: both history lists plus
 * the current account and tag selections, as pretty-printed JSON.
 *
 * Import validates the whole document before touching storage. Once valid,
 * both history lists are replaced wholesale (never merged), and non-empty
 * current selections overwrite the live ones. UUID-shaped current values are
 * also upserted into history so they show up in the dropdowns even when the
 * exported history predates them.
 */
use crate::core::history::{
    HistoryEntry, HistoryError, HistoryKind, HistoryStoreOperations, normalize_entries,
};
use crate::core::identifiers::{is_uuid, parse_tag_ids};
use crate::core::selection::SelectionStoreOperations;
use crate::core::storage::StorageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const BACKUP_VERSION: u32 = 1;
pub const DEFAULT_BACKUP_FILENAME: &str = "export-to-ghostfolio-ids-backup.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSection {
    pub current: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: u32,
    pub exported_at: String,
    pub account: BackupSection,
    pub tags: BackupSection,
}

// A validated, normalized backup that has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBackup {
    pub account_history: Vec<HistoryEntry>,
    pub tag_history: Vec<HistoryEntry>,
    pub account_current: Option<String>,
    pub tags_current: Option<String>,
}

// What an import changed, for the caller to refresh its view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBackup {
    pub account_current: Option<String>,
    pub tags_current: Option<String>,
    pub account_entries: usize,
    pub tag_entries: usize,
}

#[derive(Debug)]
pub enum BackupError {
    Serde(serde_json::Error),
    InvalidFormat,
    UnsupportedVersion(String),
    Timestamp(time::error::Format),
    History(HistoryError),
    Storage(StorageError),
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        BackupError::Serde(err)
    }
}

impl From<time::error::Format> for BackupError {
    fn from(err: time::error::Format) -> Self {
        BackupError::Timestamp(err)
    }
}

impl From<HistoryError> for BackupError {
    fn from(err: HistoryError) -> Self {
        BackupError::History(err)
    }
}

impl From<StorageError> for BackupError {
    fn from(err: StorageError) -> Self {
        BackupError::Storage(err)
    }
}

impl std::fmt::Display for BackupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupError::Serde(e) => write!(f, "{e}"),
            BackupError::InvalidFormat => write!(f, "Invalid backup file format."),
            BackupError::UnsupportedVersion(v) => write!(f, "Unsupported backup version: {v}"),
            BackupError::Timestamp(e) => write!(f, "Could not format export time: {e}"),
            BackupError::History(e) => write!(f, "{e}"),
            BackupError::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackupError::Serde(e) => Some(e),
            BackupError::Timestamp(e) => Some(e),
            BackupError::History(e) => Some(e),
            BackupError::Storage(e) => Some(e),
            BackupError::InvalidFormat | BackupError::UnsupportedVersion(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

pub fn build_backup(
    history: &dyn HistoryStoreOperations,
    selection: &dyn SelectionStoreOperations,
    exported_at: String,
) -> BackupDocument {
    BackupDocument {
        version: BACKUP_VERSION,
        exported_at,
        account: BackupSection {
            current: selection.load_current(HistoryKind::Accounts),
            history: history.load(HistoryKind::Accounts),
        },
        tags: BackupSection {
            current: selection.load_current(HistoryKind::Tags),
            history: history.load(HistoryKind::Tags),
        },
    }
}

// Snapshot of the current state, stamped with the current UTC time.
pub fn export_backup_json(
    history: &dyn HistoryStoreOperations,
    selection: &dyn SelectionStoreOperations,
) -> Result<String> {
    let exported_at = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let document = build_backup(history, selection, exported_at);
    Ok(serde_json::to_string_pretty(&document)?)
}

fn section_history(section: Option<&Value>) -> Vec<HistoryEntry> {
    section
        .and_then(|s| s.get("history"))
        .and_then(Value::as_array)
        .map(|values| normalize_entries(values))
        .unwrap_or_default()
}

fn section_current(section: Option<&Value>) -> Option<String> {
    section
        .and_then(|s| s.get("current"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|current| !current.is_empty())
        .map(str::to_string)
}

/*
 * Parses and validates a backup document without side effects. The top level
 * must be a JSON object whose `version` is exactly 1. Missing or malformed
 * sections degrade to empty histories and no current value.
 */
pub fn parse_backup(text: &str) -> Result<ParsedBackup> {
    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(BackupError::InvalidFormat)?;
    match object.get("version") {
        Some(version) if version.as_f64() == Some(f64::from(BACKUP_VERSION)) => {}
        Some(version) => return Err(BackupError::UnsupportedVersion(version.to_string())),
        None => return Err(BackupError::UnsupportedVersion("undefined".to_string())),
    }
    let account = object.get("account");
    let tags = object.get("tags");
    Ok(ParsedBackup {
        account_history: section_history(account),
        tag_history: section_history(tags),
        account_current: section_current(account),
        tags_current: section_current(tags),
    })
}

// Imported entries keep their position and timestamp; only ids absent from
// the imported history are added.
fn seed_missing(history: &dyn HistoryStoreOperations, kind: HistoryKind, id: &str) -> Result<()> {
    if history.find(kind, id).is_none() {
        history.upsert(kind, id, None, None)?;
    }
    Ok(())
}

pub fn apply_backup(
    text: &str,
    history: &dyn HistoryStoreOperations,
    selection: &dyn SelectionStoreOperations,
) -> Result<AppliedBackup> {
    let parsed = parse_backup(text)?;
    let account_entries = parsed.account_history.len();
    let tag_entries = parsed.tag_history.len();
    log::debug!(
        "Backup: Applying backup with {account_entries} account and {tag_entries} tag entries."
    );

    history.replace_all(HistoryKind::Accounts, parsed.account_history)?;
    history.replace_all(HistoryKind::Tags, parsed.tag_history)?;

    if let Some(account) = &parsed.account_current {
        selection.save_current(HistoryKind::Accounts, account)?;
        if is_uuid(account) {
            seed_missing(history, HistoryKind::Accounts, account)?;
        }
    }
    if let Some(tags) = &parsed.tags_current {
        selection.save_current(HistoryKind::Tags, tags)?;
        for tag in parse_tag_ids(tags).iter().filter(|tag| is_uuid(tag)) {
            seed_missing(history, HistoryKind::Tags, tag)?;
        }
    }

    Ok(AppliedBackup {
        account_current: parsed.account_current,
        tags_current: parsed.tags_current,
        account_entries,
        tag_entries,
    })
}
