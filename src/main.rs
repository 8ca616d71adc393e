// src/main.rs

mod app_logic;
mod core;
mod platform_layer;

use crate::app_logic::FormLogic;
use crate::core::path_utils;
use crate::core::{
    AppConfig, ClipboardOperations, ConfigManagerOperations, ConverterOperations, CoreClipboard,
    CoreConfigManager, CoreConverterClient, CoreHistoryStore, CoreKeyValueStore,
    CoreSelectionStore, HistoryStoreOperations, KeyValueStoreOperations,
    SelectionStoreOperations,
};
use crate::platform_layer::{PlatformError, PlatformEventHandler, PlatformInterface, PlatformResult};

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::sync::{Arc, Mutex};

pub(crate) const APP_NAME: &str = "GhostfolioForm";

/*
 * Sets up logging to the terminal at the configured level and, when the
 * application directory is available, to a log file at debug level.
 * An unknown level name falls back to warnings only.
 */
fn initialize_logging(config: &AppConfig) {
    let term_level = config.log_level.parse().unwrap_or(LevelFilter::Warn);
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        term_level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));
    let log_file = path_utils::get_log_file_path(APP_NAME)
        .and_then(|path| File::create(&path).ok().map(|file| (path, file)));
    let log_path = log_file.as_ref().map(|(path, _)| path.clone());
    if let Some((_, file)) = log_file {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, file));
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logger: {e}");
        return;
    }
    match log_path {
        Some(path) => log::debug!("Main: Logging to {path:?} at debug level."),
        None => log::warn!("Main: No log file available, logging to the terminal only."),
    }
}

fn main() -> PlatformResult<()> {
    let config_manager = CoreConfigManager::new();
    let (config, config_error) = match config_manager.load_config(APP_NAME) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    initialize_logging(&config);
    if let Some(e) = config_error {
        log::warn!("Main: Could not load configuration, using defaults: {e}");
    }
    log::debug!("Main: Starting with {config:?}");

    let storage = CoreKeyValueStore::open_default(APP_NAME).map_err(|e| {
        log::error!("Main: Could not open local storage: {e}");
        PlatformError::InitializationFailed(format!("Could not open local storage: {e}"))
    })?;
    log::debug!("Main: Local storage at {:?}", storage.file_path());
    let storage: Arc<dyn KeyValueStoreOperations> = Arc::new(storage);

    let converter = CoreConverterClient::new(&config.server_url, config.request_timeout())
        .map_err(|e| {
            PlatformError::InitializationFailed(format!("Could not create HTTP client: {e}"))
        })?;
    log::debug!("Main: Converting via {}", converter.endpoint());

    let history: Arc<dyn HistoryStoreOperations> =
        Arc::new(CoreHistoryStore::new(Arc::clone(&storage)));
    let selection: Arc<dyn SelectionStoreOperations> =
        Arc::new(CoreSelectionStore::new(Arc::clone(&storage)));
    let converter: Arc<dyn ConverterOperations> = Arc::new(converter);
    let clipboard: Arc<dyn ClipboardOperations> = Arc::new(CoreClipboard::new());

    let logic = FormLogic::new(
        history,
        selection,
        converter,
        clipboard,
        config.resolved_download_dir(),
    );
    let event_handler: Arc<Mutex<dyn PlatformEventHandler>> = Arc::new(Mutex::new(logic));

    let platform = PlatformInterface::new("Ghostfolio CSV Converter".to_string())?;
    let run_result = platform.run(event_handler);
    log::debug!("Main: Application exited.");
    run_result
}
