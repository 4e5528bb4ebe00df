// Smart History platform paths
// Resolves where the settings file and the state database live on each OS.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Overrides the settings file path.
pub const CONFIG_PATH_ENV: &str = "SMART_HISTORY_CONFIG";
/// Overrides the directory holding `smart-history.db`.
pub const DATA_DIR_ENV: &str = "SMART_HISTORY_DATA_DIR";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/smart-history` or `~/.config/smart-history`
/// - **macOS**: `~/Library/Application Support/SmartHistory`
/// - **Windows**: `%APPDATA%/SmartHistory`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the directory for the state database, honoring `SMART_HISTORY_DATA_DIR`.
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Settings file path, honoring `SMART_HISTORY_CONFIG`.
pub fn settings_path_override() -> Option<String> {
    env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty())
}
