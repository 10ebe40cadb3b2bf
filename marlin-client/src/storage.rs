//! Persisted session token
//!
//! Exactly one value survives a restart: the bearer token string. Role
//! and permissions are never written to disk; they are re-derived from
//! the token on hydration, so a tampered file cannot grant access.

use std::fs;
use std::path::{Path, PathBuf};

/// File-backed storage for the session token.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    /// Create storage rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let path = data_dir.into().join("session.token");
        Self { path }
    }

    fn ensure_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Persist the token
    pub fn save(&self, token: &str) -> std::io::Result<()> {
        self.ensure_dir()?;
        fs::write(&self.path, token)
    }

    /// Load the persisted token, if any
    pub fn load(&self) -> Option<String> {
        if !self.path.exists() {
            return None;
        }
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Check whether a token is persisted
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Erase the persisted token
    pub fn delete(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_load_delete_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = TokenStorage::new(dir.path());

        assert!(!storage.exists());
        assert!(storage.load().is_none());

        storage.save("header.payload.signature").unwrap();
        assert!(storage.exists());
        assert_eq!(storage.load().as_deref(), Some("header.payload.signature"));

        storage.delete().unwrap();
        assert!(!storage.exists());
        assert!(storage.load().is_none());

        // Deleting again is a no-op
        storage.delete().unwrap();
    }

    #[test]
    fn empty_file_loads_as_absent() {
        let dir = TempDir::new().unwrap();
        let storage = TokenStorage::new(dir.path());
        storage.save("").unwrap();
        assert!(storage.load().is_none());
    }

    #[test]
    fn creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let storage = TokenStorage::new(dir.path().join("nested/auth"));
        storage.save("token").unwrap();
        assert_eq!(storage.load().as_deref(), Some("token"));
    }
}
