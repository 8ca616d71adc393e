/*
 * The bounded most-recently-used lists of account and tag identifiers.
 *
 * Each list is stored as a JSON array of `HistoryEntry` under its own key in
 * the key-value store. A list never holds more than `MAX_HISTORY_ENTRIES`
 * entries and never holds two entries whose ids match case-insensitively.
 * Writes place the touched entry at the front, so the stored order is the
 * order of most recent writes; display code sorts by `last_used` instead.
 *
 * Reads are forgiving: corrupt or foreign data in storage is treated as an
 * empty list, and individual records without a string id are skipped.
 */
use crate::core::identifiers::ids_match;
use crate::core::storage::{KeyValueStoreOperations, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use time::OffsetDateTime;

pub const MAX_HISTORY_ENTRIES: usize = 100;

pub const ACCOUNT_CURRENT_KEY: &str = "ghostfolio_account_id";
pub const TAGS_CURRENT_KEY: &str = "ghostfolio_tag_ids";
pub const ACCOUNT_HISTORY_KEY: &str = "ghostfolio_account_history_v1";
pub const TAGS_HISTORY_KEY: &str = "ghostfolio_tag_history_v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Accounts,
    Tags,
}

impl HistoryKind {
    pub fn history_key(self) -> &'static str {
        match self {
            HistoryKind::Accounts => ACCOUNT_HISTORY_KEY,
            HistoryKind::Tags => TAGS_HISTORY_KEY,
        }
    }

    pub fn current_key(self) -> &'static str {
        match self {
            HistoryKind::Accounts => ACCOUNT_CURRENT_KEY,
            HistoryKind::Tags => TAGS_CURRENT_KEY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub last_used: i64,
}

impl HistoryEntry {
    pub fn new(id: impl Into<String>, alias: impl Into<String>, last_used: i64) -> Self {
        HistoryEntry {
            id: id.into(),
            alias: alias.into(),
            last_used,
        }
    }

    // The alias if it has any visible content.
    pub fn display_alias(&self) -> Option<&str> {
        let trimmed = self.alias.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug)]
pub enum HistoryError {
    Storage(StorageError),
    Serde(serde_json::Error),
}

impl From<StorageError> for HistoryError {
    fn from(err: StorageError) -> Self {
        HistoryError::Storage(err)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::Serde(err)
    }
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::Storage(e) => write!(f, "Could not save history: {e}"),
            HistoryError::Serde(e) => write!(f, "Could not encode history: {e}"),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::Storage(e) => Some(e),
            HistoryError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;

pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/*
 * Converts loosely-typed JSON records into history entries. Records that are
 * not objects or lack a string `id` are dropped; a non-string `alias` becomes
 * empty and a non-numeric `lastUsed` becomes 0. At most `MAX_HISTORY_ENTRIES`
 * entries are kept. Used both for reading storage and for backup import.
 */
pub fn normalize_entries(values: &[Value]) -> Vec<HistoryEntry> {
    values
        .iter()
        .filter_map(|value| {
            let id = value.get("id")?.as_str()?;
            let alias = value.get("alias").and_then(Value::as_str).unwrap_or_default();
            let last_used = value
                .get("lastUsed")
                .and_then(Value::as_f64)
                .map(|millis| millis as i64)
                .unwrap_or(0);
            Some(HistoryEntry::new(id, alias, last_used))
        })
        .take(MAX_HISTORY_ENTRIES)
        .collect()
}

// Most recently used first. The sort is stable, so ties keep stored order.
pub fn sorted_by_recency(entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.last_used.cmp(&a.last_used));
    sorted
}

pub fn find_entry<'a>(entries: &'a [HistoryEntry], id: &str) -> Option<&'a HistoryEntry> {
    entries.iter().find(|entry| ids_match(&entry.id, id))
}

pub trait HistoryStoreOperations: Send + Sync {
    fn load(&self, kind: HistoryKind) -> Vec<HistoryEntry>;
    fn upsert(
        &self,
        kind: HistoryKind,
        id: &str,
        alias: Option<&str>,
        timestamp: Option<i64>,
    ) -> Result<()>;
    fn remove(&self, kind: HistoryKind, id: &str) -> Result<()>;
    fn set_alias(&self, kind: HistoryKind, id: &str, alias: &str) -> Result<()>;
    fn replace_all(&self, kind: HistoryKind, entries: Vec<HistoryEntry>) -> Result<()>;

    fn find(&self, kind: HistoryKind, id: &str) -> Option<HistoryEntry> {
        find_entry(&self.load(kind), id).cloned()
    }
}

pub struct CoreHistoryStore {
    store: Arc<dyn KeyValueStoreOperations>,
}

impl CoreHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStoreOperations>) -> Self {
        CoreHistoryStore { store }
    }

    fn save(&self, kind: HistoryKind, mut entries: Vec<HistoryEntry>) -> Result<()> {
        entries.truncate(MAX_HISTORY_ENTRIES);
        let json = serde_json::to_string(&entries)?;
        self.store.set_item(kind.history_key(), &json).map_err(|e| {
            log::error!("CoreHistoryStore: Failed to save {kind:?} history: {e}");
            HistoryError::from(e)
        })
    }
}

impl HistoryStoreOperations for CoreHistoryStore {
    fn load(&self, kind: HistoryKind) -> Vec<HistoryEntry> {
        let Some(raw) = self.store.get_item(kind.history_key()) else {
            return Vec::new();
        };
        if raw.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(values)) => normalize_entries(&values),
            Ok(_) => {
                log::warn!("CoreHistoryStore: Stored {kind:?} history is not an array, ignoring.");
                Vec::new()
            }
            Err(e) => {
                log::warn!("CoreHistoryStore: Stored {kind:?} history is corrupt, ignoring: {e}");
                Vec::new()
            }
        }
    }

    /*
     * Moves (or inserts) the entry for `id` to the front. An existing alias is
     * kept unless `alias` is given; the stored id takes the casing of `id`.
     */
    fn upsert(
        &self,
        kind: HistoryKind,
        id: &str,
        alias: Option<&str>,
        timestamp: Option<i64>,
    ) -> Result<()> {
        let mut entries = self.load(kind);
        let existing = entries
            .iter()
            .position(|entry| ids_match(&entry.id, id))
            .map(|idx| entries.remove(idx));
        let alias = match (alias, existing) {
            (Some(alias), _) => alias.to_string(),
            (None, Some(previous)) => previous.alias,
            (None, None) => String::new(),
        };
        let last_used = timestamp.unwrap_or_else(now_millis);
        log::trace!("CoreHistoryStore: Upserting {kind:?} entry '{id}'.");
        entries.insert(0, HistoryEntry::new(id, alias, last_used));
        self.save(kind, entries)
    }

    fn remove(&self, kind: HistoryKind, id: &str) -> Result<()> {
        let mut entries = self.load(kind);
        let before = entries.len();
        entries.retain(|entry| !ids_match(&entry.id, id));
        if entries.len() == before {
            log::debug!("CoreHistoryStore: No {kind:?} entry '{id}' to remove.");
            return Ok(());
        }
        log::debug!("CoreHistoryStore: Removed {kind:?} entry '{id}'.");
        self.save(kind, entries)
    }

    // Replaces the alias in place; position and timestamp are unchanged.
    fn set_alias(&self, kind: HistoryKind, id: &str, alias: &str) -> Result<()> {
        let mut entries = self.load(kind);
        match entries.iter_mut().find(|entry| ids_match(&entry.id, id)) {
            Some(entry) => entry.alias = alias.to_string(),
            None => entries.insert(0, HistoryEntry::new(id, alias, now_millis())),
        }
        log::debug!("CoreHistoryStore: Set alias of {kind:?} entry '{id}' to '{alias}'.");
        self.save(kind, entries)
    }

    fn replace_all(&self, kind: HistoryKind, entries: Vec<HistoryEntry>) -> Result<()> {
        log::debug!(
            "CoreHistoryStore: Replacing {kind:?} history with {} entries.",
            entries.len()
        );
        self.save(kind, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryKeyValueStore;
    use serde_json::json;
    use std::collections::HashSet;

    const ID_A: &str = "550e8400-e29b-41d4-a716-446655440000";
    const ID_B: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn make_store() -> (Arc<MemoryKeyValueStore>, CoreHistoryStore) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let history = CoreHistoryStore::new(kv.clone());
        (kv, history)
    }

    fn numbered_id(n: usize) -> String {
        format!("00000000-0000-4000-8000-{n:012}")
    }

    #[test]
    fn test_load_empty_when_nothing_stored() {
        let (_kv, history) = make_store();
        assert!(history.load(HistoryKind::Accounts).is_empty());
    }

    #[test]
    fn test_load_tolerates_corrupt_storage() {
        let (kv, history) = make_store();
        kv.set_item(ACCOUNT_HISTORY_KEY, "[{ broken").unwrap();
        kv.set_item(TAGS_HISTORY_KEY, r#"{"id":"x"}"#).unwrap();

        assert!(history.load(HistoryKind::Accounts).is_empty());
        assert!(history.load(HistoryKind::Tags).is_empty());
    }

    #[test]
    fn test_load_filters_and_coerces_records() {
        let (kv, history) = make_store();
        let stored = json!([
            { "id": ID_A, "alias": "Main", "lastUsed": 42 },
            { "alias": "no id" },
            { "id": 7 },
            "just a string",
            { "id": ID_B, "alias": 5, "lastUsed": "yesterday" }
        ]);
        kv.set_item(TAGS_HISTORY_KEY, &stored.to_string()).unwrap();

        let entries = history.load(HistoryKind::Tags);

        assert_eq!(
            entries,
            vec![HistoryEntry::new(ID_A, "Main", 42), HistoryEntry::new(ID_B, "", 0)]
        );
    }

    #[test]
    fn test_upsert_moves_existing_entry_to_front_and_keeps_alias() {
        let (_kv, history) = make_store();
        history
            .upsert(HistoryKind::Accounts, ID_A, Some("Broker"), Some(1))
            .unwrap();
        history
            .upsert(HistoryKind::Accounts, ID_B, None, Some(2))
            .unwrap();

        history
            .upsert(HistoryKind::Accounts, &ID_A.to_uppercase(), None, Some(3))
            .unwrap();

        let entries = history.load(HistoryKind::Accounts);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], HistoryEntry::new(ID_A.to_uppercase(), "Broker", 3));
        assert_eq!(entries[1].id, ID_B);
    }

    #[test]
    fn test_upsert_with_explicit_alias_overwrites() {
        let (_kv, history) = make_store();
        history
            .upsert(HistoryKind::Tags, ID_A, Some("Old"), Some(1))
            .unwrap();
        history
            .upsert(HistoryKind::Tags, ID_A, Some(""), Some(2))
            .unwrap();

        assert_eq!(history.find(HistoryKind::Tags, ID_A).unwrap().alias, "");
    }

    #[test]
    fn test_upsert_defaults_timestamp_to_now() {
        let (_kv, history) = make_store();
        let before = now_millis();

        history.upsert(HistoryKind::Tags, ID_A, None, None).unwrap();

        let entry = history.find(HistoryKind::Tags, ID_A).unwrap();
        assert!(entry.last_used >= before);
    }

    #[test]
    fn test_upsert_sequence_respects_cap_uniqueness_and_recency() {
        let (_kv, history) = make_store();
        let mut last = String::new();
        for round in 0..3 {
            for n in 0..(MAX_HISTORY_ENTRIES + 20) {
                let id = if (n + round) % 2 == 0 {
                    numbered_id(n)
                } else {
                    numbered_id(n).to_uppercase()
                };
                history
                    .upsert(HistoryKind::Tags, &id, None, Some((round * 1000 + n) as i64))
                    .unwrap();
                last = id;
            }
        }

        let entries = history.load(HistoryKind::Tags);
        assert_eq!(entries.len(), MAX_HISTORY_ENTRIES);
        let unique: HashSet<String> = entries.iter().map(|e| e.id.to_lowercase()).collect();
        assert_eq!(unique.len(), entries.len());
        assert_eq!(entries[0].id, last);
    }

    #[test]
    fn test_lists_are_independent() {
        let (_kv, history) = make_store();
        history.upsert(HistoryKind::Accounts, ID_A, None, Some(1)).unwrap();

        assert!(history.load(HistoryKind::Tags).is_empty());
        assert_eq!(history.load(HistoryKind::Accounts).len(), 1);
    }

    #[test]
    fn test_remove_is_case_insensitive_and_noop_when_absent() {
        let (_kv, history) = make_store();
        history.upsert(HistoryKind::Accounts, ID_A, None, Some(1)).unwrap();
        history.upsert(HistoryKind::Accounts, ID_B, None, Some(2)).unwrap();

        history
            .remove(HistoryKind::Accounts, &ID_A.to_uppercase())
            .unwrap();
        history.remove(HistoryKind::Accounts, "missing").unwrap();

        let entries = history.load(HistoryKind::Accounts);
        assert_eq!(entries.len(), 1);
        assert!(find_entry(&entries, ID_A).is_none());
    }

    #[test]
    fn test_set_alias_keeps_position_and_timestamp() {
        let (_kv, history) = make_store();
        history.upsert(HistoryKind::Tags, ID_A, Some("Growth"), Some(10)).unwrap();
        history.upsert(HistoryKind::Tags, ID_B, None, Some(20)).unwrap();

        history.set_alias(HistoryKind::Tags, ID_A, "").unwrap();

        let entries = history.load(HistoryKind::Tags);
        assert_eq!(entries[1], HistoryEntry::new(ID_A, "", 10));
        assert_eq!(entries[0].id, ID_B);
    }

    #[test]
    fn test_set_alias_creates_missing_entry_at_front() {
        let (_kv, history) = make_store();
        history.upsert(HistoryKind::Tags, ID_B, None, Some(20)).unwrap();

        history.set_alias(HistoryKind::Tags, ID_A, "Dividends").unwrap();

        let entries = history.load(HistoryKind::Tags);
        assert_eq!(entries[0].id, ID_A);
        assert_eq!(entries[0].alias, "Dividends");
    }

    #[test]
    fn test_replace_all_truncates() {
        let (_kv, history) = make_store();
        let entries: Vec<HistoryEntry> = (0..150)
            .map(|n| HistoryEntry::new(numbered_id(n), "", n as i64))
            .collect();

        history.replace_all(HistoryKind::Accounts, entries).unwrap();

        let loaded = history.load(HistoryKind::Accounts);
        assert_eq!(loaded.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(loaded[0].id, numbered_id(0));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let (kv, history) = make_store();
        kv.set_fail_writes(true);

        let result = history.upsert(HistoryKind::Accounts, ID_A, None, None);

        assert!(matches!(result, Err(HistoryError::Storage(_))));
    }

    #[test]
    fn test_sorted_by_recency_orders_by_last_used_descending() {
        let entries = vec![
            HistoryEntry::new("a", "", 1),
            HistoryEntry::new("b", "", 3),
            HistoryEntry::new("c", "", 2),
        ];

        let ids: Vec<String> = sorted_by_recency(&entries).into_iter().map(|e| e.id).collect();

        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_entries_serialize_with_camel_case_fields() {
        let value = serde_json::to_value(HistoryEntry::new(ID_A, "Main", 5)).unwrap();
        assert_eq!(value, json!({ "id": ID_A, "alias": "Main", "lastUsed": 5 }));
    }
}
