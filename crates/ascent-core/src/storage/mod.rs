mod config;
pub mod journal;

pub use config::{Config, MenuConfig, MenuPreset, TimerConfig};
pub use journal::{EntryLog, PracticeEntry};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `ASCENT_DATA_DIR` wins when set. Otherwise `~/.config/ascent[-dev]/`,
/// with the `-dev` suffix when `ASCENT_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("ASCENT_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("ASCENT_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("ascent-dev")
            } else {
                base_dir.join("ascent")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
