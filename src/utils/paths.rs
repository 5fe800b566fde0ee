//! Cross-Platform Path Utilities
//!
//! Functions for resolving the Writedeck data directory (`~/.writedeck/`,
//! or `$WRITEDECK_HOME` when set) and the files inside it.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Environment variable overriding the data directory
pub const HOME_ENV_VAR: &str = "WRITEDECK_HOME";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Writedeck directory (`$WRITEDECK_HOME` or `~/.writedeck/`)
pub fn writedeck_dir() -> AppResult<PathBuf> {
    match std::env::var_os(HOME_ENV_VAR) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(home_dir()?.join(".writedeck")),
    }
}

/// Get the config file path (`<dir>/config.json`)
pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join("config.json")
}

/// Get the key-value store directory (`<dir>/store/`)
pub fn store_dir_in(dir: &Path) -> PathBuf {
    dir.join("store")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Replace `path` with `contents` through a temp file in the same directory,
/// so readers see either the old or the new contents, never a mix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Get the Writedeck directory, creating it if it doesn't exist
pub fn ensure_writedeck_dir() -> AppResult<PathBuf> {
    let path = writedeck_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
