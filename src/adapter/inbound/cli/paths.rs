//! Path utilities for berth.
//!
//! The default configuration lives at `~/.berth/config.toml`.

use std::path::PathBuf;

/// Returns the berth home directory (`~/.berth/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".berth")
}

/// Returns the default config file path (`~/.berth/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}
