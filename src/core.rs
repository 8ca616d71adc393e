/*
 * This module consolidates the core, platform-agnostic logic of the application.
 * It re-exports the key data structures and the trait abstractions
 * (`KeyValueStoreOperations`, `HistoryStoreOperations`, `SelectionStoreOperations`,
 * `ConverterOperations`, `ClipboardOperations`, `ConfigManagerOperations`) used by
 * the form logic for persisted state, identifier history, conversion requests,
 * clipboard access and configuration.
 */
pub mod backup;
pub mod clipboard;
pub mod config;
pub mod converter_client;
pub mod history;
pub mod identifiers;
pub mod path_utils;
pub mod selection;
pub mod storage;

pub use backup::DEFAULT_BACKUP_FILENAME;
pub use clipboard::{ClipboardError, ClipboardOperations, CoreClipboard};
pub use config::{AppConfig, ConfigManagerOperations, CoreConfigManager};
pub use converter_client::{
    ConvertError, ConvertRequest, ConvertedFile, ConverterOperations, CoreConverterClient,
};
pub use history::{CoreHistoryStore, HistoryEntry, HistoryKind, HistoryStoreOperations};
pub use identifiers::ValidationError;
pub use selection::{CoreSelectionStore, SelectionStoreOperations};
pub use storage::{CoreKeyValueStore, KeyValueStoreOperations};
