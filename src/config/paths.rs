//! Where the assistant keeps its files.
//!
//! Everything lives under `<config base>/desk-assistant/data`, where the base
//! is `%APPDATA%` on Windows, `~/Library/Application Support` on macOS and
//! `$XDG_CONFIG_HOME` (or `~/.config`) elsewhere.

use std::path::PathBuf;

const APP_DIR: &str = "desk-assistant";

pub fn get_data_dir() -> PathBuf {
    config_base().join(APP_DIR).join("data")
}

/// Directory for rolling log files.
pub fn get_log_dir() -> PathBuf {
    get_data_dir().join("logs")
}

/// The user's Desktop, where datasets are looked up by default.
pub fn get_desktop_dir() -> PathBuf {
    dirs::desktop_dir().unwrap_or_else(|| home().join("Desktop"))
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `dirs::config_dir` already resolves the per-platform base; the fallback
/// only matters when no home directory can be found either.
fn config_base() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| {
        let relative: &[&str] = if cfg!(target_os = "windows") {
            &["AppData", "Roaming"]
        } else if cfg!(target_os = "macos") {
            &["Library", "Application Support"]
        } else {
            &[".config"]
        };
        relative.iter().fold(home(), |path, part| path.join(part))
    })
}
