// ChannelTabs platform paths for Linux
// Config: ~/.config/channeltabs
// Data:   ~/.local/share/channeltabs

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/channeltabs` if set, otherwise `~/.config/channeltabs`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("channeltabs"),
        Err(_) => home_dir().join(".config").join("channeltabs"),
    }
}

/// Uses `$XDG_DATA_HOME/channeltabs` if set, otherwise `~/.local/share/channeltabs`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("channeltabs"),
        Err(_) => home_dir().join(".local").join("share").join("channeltabs"),
    }
}
