use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

const CONFIG_DIR: &str = "t20_terminal";
const TOKEN_FILE: &str = "token";

/// Source of the opaque bearer credential. Injected into the gateway at
/// construction so tests can swap in a fixed token and nothing reads
/// ambient global state.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Fixed token (or none), for tests and one-shot calls.
pub struct StaticToken(pub Option<String>);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Token persisted as a single line under the user config dir. Reads are
/// per-call so a token saved after login is picked up without restart.
#[derive(Debug, Default)]
pub struct FileTokenStore;

impl FileTokenStore {
    pub fn save(&self, token: &str) -> Result<()> {
        let path = token_path().context("no writable config directory")?;
        let dir = path.parent().context("token path has no parent")?;
        fs::create_dir_all(dir).context("create config directory")?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, token).context("write token")?;
        fs::rename(&tmp, &path).context("swap token file")?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let Some(path) = token_path() else {
            return Ok(());
        };
        if path.exists() {
            fs::remove_file(&path).context("remove token file")?;
        }
        Ok(())
    }
}

impl CredentialProvider for FileTokenStore {
    fn token(&self) -> Option<String> {
        let path = token_path()?;
        let raw = fs::read_to_string(path).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn token_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CONFIG_DIR).join(TOKEN_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR)
            .join(TOKEN_FILE),
    )
}
