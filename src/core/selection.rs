/*
 * Persistence of the current form selections: the account id and the tag-ids
 * string that populate the form fields. These are stored separately from the
 * history lists so the filled-in form survives a restart on its own.
 */
use crate::core::history::HistoryKind;
use crate::core::storage::{self, KeyValueStoreOperations};
use std::sync::Arc;

pub trait SelectionStoreOperations: Send + Sync {
    // The saved value for the field, or an empty string.
    fn load_current(&self, kind: HistoryKind) -> String;
    fn save_current(&self, kind: HistoryKind, value: &str) -> storage::Result<()>;
}

pub struct CoreSelectionStore {
    store: Arc<dyn KeyValueStoreOperations>,
}

impl CoreSelectionStore {
    pub fn new(store: Arc<dyn KeyValueStoreOperations>) -> Self {
        CoreSelectionStore { store }
    }
}

impl SelectionStoreOperations for CoreSelectionStore {
    fn load_current(&self, kind: HistoryKind) -> String {
        self.store.get_item(kind.current_key()).unwrap_or_default()
    }

    fn save_current(&self, kind: HistoryKind, value: &str) -> storage::Result<()> {
        log::trace!("CoreSelectionStore: Saving current {kind:?} value '{value}'.");
        self.store.set_item(kind.current_key(), value)
    }
}
