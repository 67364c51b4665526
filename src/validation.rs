//! Startup checks: everything that must hold before any manifest work begins.

use crate::config::UpdateConfig;
use crate::error::{Result, UpdateError};
use std::fs;
use std::path::{Path, PathBuf};

/// Normalises a `--testroot` value into an absolute path.
///
/// The value is trimmed, must not be empty or `/`, and a leading `~` is
/// expanded. Symlinks are resolved when the directory already exists.
pub fn validate_test_root(value: &str) -> Result<PathBuf> {
    let value = value.trim();
    if value.is_empty() || value == "/" {
        return Err(UpdateError::InvalidTestRoot(value.to_string()));
    }

    let expanded = expand_home(value)?;
    let absolute = match fs::canonicalize(&expanded) {
        Ok(path) => path,
        Err(_) => std::path::absolute(&expanded)?,
    };

    if absolute == Path::new("/") {
        return Err(UpdateError::InvalidTestRoot(value.to_string()));
    }
    Ok(absolute)
}

/// `clap` value parser for `--testroot`.
pub fn parse_test_root(value: &str) -> std::result::Result<PathBuf, String> {
    validate_test_root(value).map_err(|e| e.to_string())
}

fn expand_home(value: &str) -> Result<PathBuf> {
    let rest = match value.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(value)),
    };

    let home = dirs::home_dir().ok_or_else(|| {
        UpdateError::Other(anyhow::anyhow!("Cannot expand '~': home directory unknown"))
    })?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Walks up from `start` to the first directory containing `.repo/`.
pub fn find_checkout_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".repo").is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| UpdateError::CheckoutRootNotFound(start.to_path_buf()))
}

/// Confirms the browser sources are present in the checkout.
pub fn check_source_root(checkout_root: &Path, config: &UpdateConfig) -> Result<PathBuf> {
    let src = checkout_root.join(&config.src_root);
    if !src.is_dir() {
        log::error!("Expected browser sources at {}", src.display());
        return Err(UpdateError::SourceDirNotFound(src));
    }
    Ok(src)
}
