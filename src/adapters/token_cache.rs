use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// File holding the Hangouts refresh token between runs. Empty until the first
/// successful login.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Opens the cache, creating an empty file if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, b"")?;
            tracing::debug!("Created empty token cache at {}", path.display());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>> {
        let token = fs::read_to_string(&self.path)?;
        let token = token.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    pub fn store(&self, token: &str) -> Result<()> {
        fs::write(&self.path, token.trim())?;
        Ok(())
    }
}
