//! Client configuration

use std::path::PathBuf;

use crate::error::ClientResult;
use crate::http::NetworkTransport;
use crate::storage::TokenStorage;

/// Configuration for connecting to the banking backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "https://localhost:7032/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory holding the persisted session token
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Create a new configuration for the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            data_dir: PathBuf::from(".marlin"),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the directory holding the persisted session token
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Create a network transport from this configuration
    pub fn build_transport(&self) -> ClientResult<NetworkTransport> {
        NetworkTransport::new(self)
    }

    /// Create the token storage rooted at this configuration's data dir
    pub fn token_storage(&self) -> TokenStorage {
        TokenStorage::new(&self.data_dir)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("https://localhost:7032/api")
    }
}
