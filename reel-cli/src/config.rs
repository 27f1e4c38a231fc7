//! Configuration module
//!
//! Handles the API credentials and service address. Values come from the
//! process environment, optionally seeded from a `.env` file that sits next
//! to the executable or in the current directory.

use anyhow::{Context, Result};
use reel_client::ClientConfig;
use std::path::{Path, PathBuf};

/// Name of the dotenv file
pub const ENV_FILE_NAME: &str = ".env";

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the video service
    pub api_key: String,
    /// Base URL of the video service
    pub base_url: String,
    pub organization: Option<String>,
    pub project: Option<String>,
}

impl Config {
    /// Client configuration with the default pacing
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_key.trim())
            .with_base_url(self.base_url.trim())
            .with_organization(self.organization.clone())
            .with_project(self.project.clone())
    }
}

/// Location of the `.env` file
///
/// Prefers a file next to the executable, otherwise the current directory.
pub fn resolve_env_path() -> PathBuf {
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let candidate = dir.join(ENV_FILE_NAME);
        if candidate.is_file() {
            return candidate;
        }
    }

    match std::env::current_dir() {
        Ok(cwd) => cwd.join(ENV_FILE_NAME),
        Err(_) => PathBuf::from(ENV_FILE_NAME),
    }
}

/// Load `path` into the process environment
///
/// Variables that are already set keep their value. A missing file is not
/// an error.
///
/// # Returns
/// Whether a file was loaded
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e).with_context(|| format!("unable to load {}", path.display())),
    }
}

/// Set `key=value` in the dotenv file at `path`
///
/// Replaces an existing assignment of `key` and keeps every other line,
/// comments included. The file is created if missing and is readable by
/// the owner only.
pub fn upsert_env_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("unable to read {}", path.display())),
    };

    let mut found = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if parse_env_key(line) == Some(key) {
                found = true;
                format!("{}={}", key, value)
            } else {
                line.to_string()
            }
        })
        .collect();

    if !found {
        lines.push(format!("{}={}", key, value));
    }

    let mut content = lines.join("\n");
    content.push('\n');

    write_private(path, content.as_bytes())
        .with_context(|| format!("unable to write {}", path.display()))
}

/// Key of a `KEY=VALUE` line; `None` for blanks, comments and other text
fn parse_env_key(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, _) = trimmed.split_once('=')?;
    let key = key.trim();
    let key = key.strip_prefix("export ").map(str::trim).unwrap_or(key);
    (!key.is_empty()).then_some(key)
}

#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}
