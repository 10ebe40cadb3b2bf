//! Session store
//!
//! Process-wide session state: the bearer token plus the role and
//! permission set derived from it. The store is the single writer; every
//! other component reads cloned snapshots and never mutates fields
//! directly. Role and permissions are always derived from the token,
//! never set independently.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use shared::auth::UserProfile;

use crate::claims::{Claims, RoleId};
use crate::storage::TokenStorage;

/// Snapshot of the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub profile: Option<UserProfile>,
    pub role_id: RoleId,
    pub permissions: BTreeSet<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Versioned single-writer store for the session.
pub struct SessionStore {
    state: RwLock<Session>,
    version: AtomicU64,
    hydrated: AtomicBool,
    storage: TokenStorage,
}

impl SessionStore {
    pub fn new(storage: TokenStorage) -> Self {
        Self {
            state: RwLock::new(Session::default()),
            version: AtomicU64::new(0),
            hydrated: AtomicBool::new(false),
            storage,
        }
    }

    /// Restore the persisted token, if any, and commit it. Runs once per
    /// process; later calls are no-ops.
    pub fn hydrate(&self) {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            return;
        }
        match self.storage.load() {
            Some(token) => {
                tracing::info!("Restoring persisted session");
                self.commit(&token);
            }
            None => tracing::debug!("No persisted session"),
        }
    }

    /// Install a token: derive claims, then apply token, role and
    /// permissions in one write so no reader observes a half-updated
    /// session. Persists the token; a persist failure is logged and does
    /// not fail the commit.
    pub fn commit(&self, token: &str) {
        let claims = Claims::from_token(token);
        let role = claims.role_id;
        {
            let mut state = self.state.write();
            state.token = Some(token.to_string());
            state.role_id = claims.role_id;
            state.permissions = claims.permissions;
            // Stale under a new identity; refreshed via update_profile
            state.profile = None;
        }
        if let Err(e) = self.storage.save(token) {
            tracing::warn!("Failed to persist session token: {}", e);
        }
        self.version.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(role = role.name(), "Session committed");
    }

    /// Reset to the default unauthenticated session and erase the
    /// persisted token. Idempotent.
    pub fn clear(&self) {
        {
            let mut state = self.state.write();
            *state = Session::default();
        }
        if let Err(e) = self.storage.delete() {
            tracing::warn!("Failed to erase persisted token: {}", e);
        }
        self.version.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Session cleared");
    }

    /// Synchronous snapshot of the current session.
    pub fn read(&self) -> Session {
        self.state.read().clone()
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    /// Monotonic counter bumped by every commit and clear. Lets callers
    /// prove an authorization decision was not cached across a boundary.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Store the profile fetched from the profile endpoint. Ignored while
    /// unauthenticated; cleared by `clear`.
    pub fn update_profile(&self, profile: UserProfile) {
        let mut state = self.state.write();
        if state.token.is_some() {
            state.profile = Some(profile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use tempfile::TempDir;

    fn token_with(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("{header}.{body}.signature")
    }

    fn manager_token() -> String {
        token_with(&serde_json::json!({
            "RoleId": 2,
            "Permission": ["ViewUsers", "ApproveTransaction"],
        }))
    }

    fn profile() -> UserProfile {
        UserProfile {
            user_id: 7,
            first_name: "Morgan".to_string(),
            last_name: "Reyes".to_string(),
            email: "manager@bank.test".to_string(),
            mobile_no: "5550100".to_string(),
            address: "12 Quay St".to_string(),
            date_of_birth: "1990-04-02".to_string(),
            role_id: 2,
        }
    }

    #[test]
    fn commit_then_read_matches_extracted_claims() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(TokenStorage::new(dir.path()));
        let token = manager_token();

        store.commit(&token);

        let session = store.read();
        let claims = Claims::from_token(&token);
        assert_eq!(session.token.as_deref(), Some(token.as_str()));
        assert_eq!(session.role_id, claims.role_id);
        assert_eq!(session.permissions, claims.permissions);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(TokenStorage::new(dir.path()));
        store.commit(&manager_token());

        store.clear();
        let once = store.read();
        store.clear();
        let twice = store.read();

        assert_eq!(once, twice);
        assert_eq!(once, Session::default());
    }

    #[test]
    fn hydrate_restores_persisted_token() {
        let dir = TempDir::new().unwrap();
        let token = manager_token();
        SessionStore::new(TokenStorage::new(dir.path())).commit(&token);

        let restored = SessionStore::new(TokenStorage::new(dir.path()));
        restored.hydrate();

        let session = restored.read();
        assert_eq!(session.token.as_deref(), Some(token.as_str()));
        assert!(session.has_permission("ViewUsers"));
    }

    #[test]
    fn hydrate_without_persisted_token_stays_default() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(TokenStorage::new(dir.path()));
        store.hydrate();
        assert_eq!(store.read(), Session::default());
    }

    #[test]
    fn hydrate_runs_once() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(TokenStorage::new(dir.path()));
        store.hydrate();
        let version = store.version();
        store.hydrate();
        assert_eq!(store.version(), version);
    }

    #[test]
    fn corrupted_persisted_token_grants_nothing() {
        let dir = TempDir::new().unwrap();
        TokenStorage::new(dir.path()).save("tampered-garbage").unwrap();

        let store = SessionStore::new(TokenStorage::new(dir.path()));
        store.hydrate();

        let session = store.read();
        assert_eq!(session.role_id, RoleId::CUSTOMER);
        assert!(session.permissions.is_empty());
    }

    #[test]
    fn only_the_token_is_persisted() {
        let dir = TempDir::new().unwrap();
        let storage = TokenStorage::new(dir.path());
        let store = SessionStore::new(storage.clone());
        let token = manager_token();

        store.commit(&token);

        let on_disk = std::fs::read_to_string(storage.path()).unwrap();
        assert_eq!(on_disk, token);
    }

    #[test]
    fn version_bumps_on_commit_and_clear() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(TokenStorage::new(dir.path()));
        let v0 = store.version();
        store.commit(&manager_token());
        assert_eq!(store.version(), v0 + 1);
        store.clear();
        assert_eq!(store.version(), v0 + 2);
    }

    #[test]
    fn profile_follows_the_session_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(TokenStorage::new(dir.path()));

        // Ignored while unauthenticated
        store.update_profile(profile());
        assert!(store.read().profile.is_none());

        store.commit(&manager_token());
        store.update_profile(profile());
        assert_eq!(store.read().profile, Some(profile()));

        store.clear();
        assert!(store.read().profile.is_none());
    }
}
