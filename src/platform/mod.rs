// ChannelTabs platform abstraction
// Where the JSON and SQLite settings stores live on each OS.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Directory holding `<key>.config.json` settings files.
///
/// - **Linux**: `~/.config/channeltabs` (or `$XDG_CONFIG_HOME/channeltabs`)
/// - **macOS**: `~/Library/Application Support/ChannelTabs`
/// - **Windows**: `%APPDATA%/ChannelTabs`
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

/// Directory holding the SQLite settings database.
///
/// - **Linux**: `~/.local/share/channeltabs` (or `$XDG_DATA_HOME/channeltabs`)
/// - **macOS**: `~/Library/Application Support/ChannelTabs`
/// - **Windows**: `%APPDATA%/ChannelTabs`
pub fn get_data_dir() -> PathBuf {
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

/// Path of the SQLite settings database.
pub fn get_database_path() -> PathBuf {
    get_data_dir().join("channeltabs.db")
}
