/*
 * This module provides utility functions for locating the application's
 * per-user directories: the local configuration directory that holds the
 * persisted form state, configuration and log file, and the user's download
 * directory used as the default destination for converted files.
 */
use directories::{ProjectDirs, UserDirs};
use std::fs;
use std::path::PathBuf;

pub const LOG_FILENAME: &str = "ghostfolio_form.log";

/*
 * Retrieves the application's primary local configuration directory.
 * This function determines the platform-specific path for local (non-roaming)
 * application configuration data and ensures the directory exists, creating it
 * if necessary. The path is derived without an organization qualifier.
 *
 * Returns `None` if the directory could not be determined (e.g. no home
 * directory in the environment) or could not be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Attempting to get base app config local dir for '{app_name}'");
    ProjectDirs::from("", "", app_name).and_then(|proj_dirs| {
        let config_path = proj_dirs.config_local_dir();
        if !config_path.exists() {
            if let Err(e) = fs::create_dir_all(config_path) {
                log::error!(
                    "PathUtils: Failed to create base app config directory {config_path:?}: {e}"
                );
                return None;
            }
            log::debug!("PathUtils: Created base app config directory: {config_path:?}");
        }
        Some(config_path.to_path_buf())
    })
}

/*
 * The user's download directory, falling back to the current directory when
 * the platform does not define one.
 */
pub fn get_default_download_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn get_log_file_path(app_name: &str) -> Option<PathBuf> {
    get_base_app_config_local_dir(app_name).map(|dir| dir.join(LOG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ProjectDirs depends on the environment (a home directory must exist), so
    // these tests only assert on the returned path when one is available.

    #[test]
    fn test_get_base_app_config_local_dir_creates_and_reuses() {
        // Arrange
        let unique_app_name = format!("TestApp_PathUtils_{}", rand::random::<u128>());

        // Act
        let Some(first_path) = get_base_app_config_local_dir(&unique_app_name) else {
            return;
        };
        let second_path = get_base_app_config_local_dir(&unique_app_name);

        // Assert
        assert!(first_path.is_dir(), "Directory should have been created");
        assert!(
            first_path
                .to_string_lossy()
                .to_lowercase()
                .contains(&unique_app_name.to_lowercase()),
            "Path should contain the app name. Path: {first_path:?}"
        );
        assert_eq!(second_path.as_ref(), Some(&first_path));

        // Cleanup
        if let Err(e) = fs::remove_dir_all(&first_path) {
            eprintln!("Test cleanup error (dir: {}): {e}", first_path.display());
        }
    }

    #[test]
    fn test_log_file_path_is_inside_config_dir() {
        let unique_app_name = format!("TestApp_PathUtils_Log_{}", rand::random::<u128>());
        let Some(log_path) = get_log_file_path(&unique_app_name) else {
            return;
        };
        assert_eq!(log_path.file_name().unwrap(), LOG_FILENAME);
        if let Some(parent) = log_path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_default_download_dir_is_never_empty() {
        assert!(!get_default_download_dir().as_os_str().is_empty());
    }
}
