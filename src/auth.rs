//! # Credential Store
//!
//! Single source of truth for the current login credential.
//!
//! The bearer token and a best-effort copy of the user's display profile are
//! persisted as two small files under the per-platform config directory, so
//! a login survives process restarts the same way it would a page reload.
//! Every mutation goes straight to disk; there is no in-memory-only mode.
//!
//! The store performs no validation: [`CredentialStore::set_token`] writes
//! whatever it is given, and [`CredentialStore::is_authenticated`] is purely
//! a presence check. Deciding whether a token is still *good* is the
//! server's job (see the validate round-trip in [`crate::api`]).
//!
//! # Examples
//!
//! ```no_run
//! use botdeck::auth::CredentialStore;
//!
//! let store = CredentialStore::open().unwrap();
//! if !store.is_authenticated() {
//!     eprintln!("run `botdeck login` first");
//! }
//! ```

use crate::models::UserProfile;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

const TOKEN_FILE: &str = "token";
const PROFILE_FILE: &str = "profile.json";

/// File-backed store for the bearer token and cached profile.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Open the store rooted at the default config directory, creating the
    /// directory if needed.
    pub fn open() -> io::Result<Self> {
        let dir = crate::config_dir()
            .map_err(|e| io::Error::other(e.to_string()))?;
        Self::open_at(dir)
    }

    /// Open the store rooted at an explicit directory. Used directly by
    /// tests; `open` delegates here.
    pub fn open_at(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    /// Persist `token` as the current credential. No validation is
    /// performed here.
    pub fn set_token(&self, token: &str) -> io::Result<()> {
        debug!("persisting credential to {}", self.token_path().display());
        fs::write(self.token_path(), token)
    }

    /// Read the stored token, if any. Pure read; empty files count as
    /// absent.
    pub fn token(&self) -> Option<String> {
        match fs::read_to_string(self.token_path()) {
            Ok(t) if !t.trim().is_empty() => Some(t.trim().to_string()),
            _ => None,
        }
    }

    /// Clear the token and the cached profile. Idempotent: clearing an
    /// already-empty store succeeds.
    pub fn remove_token(&self) {
        remove_if_present(&self.token_path());
        remove_if_present(&self.profile_path());
    }

    /// Whether a credential is currently stored. Presence-only; no expiry
    /// check happens client-side.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Cache the display profile next to the token.
    pub fn set_profile(&self, profile: &UserProfile) -> io::Result<()> {
        let json = serde_json::to_string(profile)?;
        fs::write(self.profile_path(), json)
    }

    /// Read the cached profile, if any. A corrupt cache reads as absent
    /// rather than erroring; it is not authoritative.
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = fs::read_to_string(self.profile_path()).ok()?;
        serde_json::from_str(&raw).ok()
    }
}

fn remove_if_present(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            debug!("failed to remove {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempdir().unwrap();
        let store = CredentialStore::open_at(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn is_authenticated_tracks_token_presence() {
        let (_dir, store) = store();
        assert!(!store.is_authenticated());

        store.set_token("tok-123").unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok-123"));

        store.remove_token();
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
    }

    #[test]
    fn remove_token_is_idempotent_and_clears_profile() {
        let (_dir, store) = store();
        store.set_token("tok").unwrap();
        store
            .set_profile(&UserProfile {
                username: Some("alice".into()),
                email: Some("alice@x.com".into()),
            })
            .unwrap();

        store.remove_token();
        store.remove_token(); // second clear must not fail
        assert!(store.token().is_none());
        assert!(store.profile().is_none());
    }

    #[test]
    fn profile_round_trips() {
        let (_dir, store) = store();
        let profile = UserProfile {
            username: Some("alice".into()),
            email: None,
        };
        store.set_profile(&profile).unwrap();
        assert_eq!(store.profile(), Some(profile));
    }

    #[test]
    fn empty_token_file_counts_as_absent() {
        let (_dir, store) = store();
        store.set_token("").unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempdir().unwrap();
        CredentialStore::open_at(dir.path())
            .unwrap()
            .set_token("persisted")
            .unwrap();

        let reopened = CredentialStore::open_at(dir.path()).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("persisted"));
    }
}
