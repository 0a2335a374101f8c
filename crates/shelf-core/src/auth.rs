//! Authentication
//!
//! [`AuthContext`] is the shared answer to "who is signed in right now":
//! every per-user operation resolves its identity through it, and treats
//! absence as the empty/no-op branch, never as an error.
//!
//! [`AuthService`] manages local accounts (salted SHA-256 password hashes
//! stored under `accounts/{email}`) and a session file in the data
//! directory so the identity survives process restarts. Sign-up and
//! sign-in publish their outcome on a login state slot.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::ActionState;
use crate::store::{paths, UserStore};

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// Shared handle resolving the current user identity
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    current: Arc<RwLock<Option<String>>>,
}

impl AuthContext {
    /// A signed-out context
    pub fn new() -> Self {
        Self::default()
    }

    /// A context pre-set to the given identity
    pub fn with_user(uid: impl Into<String>) -> Self {
        let context = Self::new();
        context.set(uid.into());
        context
    }

    /// The authenticated user id, or `None` when signed out
    pub fn current_uid(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_uid().is_some()
    }

    fn set(&self, uid: String) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(uid);
    }

    fn clear(&self) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// A persisted sign-in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub uid: String,
    pub email: String,
}

/// Stored account record
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    uid: String,
    email: String,
    password_hash: String,
    salt: String,
    created_at: i64,
}

/// Local account management over the document store
pub struct AuthService<S> {
    store: Arc<S>,
    context: AuthContext,
    session_path: PathBuf,
    login: watch::Sender<ActionState>,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(store: Arc<S>, context: AuthContext, session_path: PathBuf) -> Self {
        Self {
            store,
            context,
            session_path,
            login: watch::channel(ActionState::Initial).0,
        }
    }

    /// Observe the login state slot
    pub fn subscribe_login(&self) -> watch::Receiver<ActionState> {
        self.login.subscribe()
    }

    /// Create an account and sign in. Returns whether the identity changed.
    pub fn sign_up(&self, email: &str, password: &str) -> bool {
        let email = normalize_email(email);
        if let Err(message) = validate_credentials(&email, password) {
            self.login.send_replace(ActionState::Error(message));
            return false;
        }

        self.login.send_replace(ActionState::Loading);
        match self.create_account(&email, password) {
            Ok(Some(session)) => {
                self.finish_sign_in(session);
                true
            }
            Ok(None) => {
                self.login.send_replace(ActionState::Error(
                    "an account with this email already exists".to_string(),
                ));
                false
            }
            Err(e) => {
                self.login
                    .send_replace(ActionState::Error(format!("sign-up failed: {}", e)));
                false
            }
        }
    }

    /// Sign in with an existing account. Returns whether the identity
    /// changed. Unknown accounts and wrong passwords share one message.
    pub fn sign_in(&self, email: &str, password: &str) -> bool {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            self.login.send_replace(ActionState::Error(
                "email and password are required".to_string(),
            ));
            return false;
        }

        self.login.send_replace(ActionState::Loading);
        let account = match self.store.get(&paths::account(&email)) {
            Ok(found) => found.and_then(|value| {
                serde_json::from_value::<Account>(value)
                    .map_err(|e| warn!("unreadable account record for {}: {}", email, e))
                    .ok()
            }),
            Err(e) => {
                self.login
                    .send_replace(ActionState::Error(format!("sign-in failed: {}", e)));
                return false;
            }
        };

        match account {
            Some(account) if hash_password(&account.salt, password) == account.password_hash => {
                self.finish_sign_in(Session {
                    uid: account.uid,
                    email,
                });
                true
            }
            _ => {
                self.login.send_replace(ActionState::Error(
                    "invalid email or password".to_string(),
                ));
                false
            }
        }
    }

    /// Sign out and forget the persisted session
    pub fn sign_out(&self) {
        if let Some(uid) = self.context.current_uid() {
            info!("signed out {}", uid);
        }
        self.context.clear();
        if self.session_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.session_path) {
                warn!("could not remove session file: {}", e);
            }
        }
        self.login.send_replace(ActionState::Initial);
    }

    /// Re-establish the identity persisted by a previous sign-in, if any
    pub fn restore_session(&self) -> Option<Session> {
        if !self.session_path.exists() {
            return None;
        }

        let session = std::fs::read_to_string(&self.session_path)
            .ok()
            .and_then(|content| serde_json::from_str::<Session>(&content).ok());

        match session {
            Some(session) => {
                self.context.set(session.uid.clone());
                Some(session)
            }
            None => {
                warn!("ignoring unreadable session file");
                None
            }
        }
    }

    fn create_account(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let path = paths::account(email);
        if self.store.get(&path)?.is_some() {
            return Ok(None);
        }

        let salt = Uuid::new_v4().to_string();
        let account = Account {
            uid: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: hash_password(&salt, password),
            salt,
            created_at: Utc::now().timestamp_millis(),
        };

        self.store.set(&path, &serde_json::to_value(&account)?)?;
        Ok(Some(Session {
            uid: account.uid,
            email: account.email,
        }))
    }

    fn finish_sign_in(&self, session: Session) {
        self.context.set(session.uid.clone());
        if let Err(e) = self.save_session(&session) {
            // Sign-in still succeeds; only restarts lose the session
            warn!("could not persist session: {}", e);
        }
        info!("signed in {} as {}", session.email, session.uid);
        self.login.send_replace(ActionState::Success);
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.session_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let content = serde_json::to_string(session)?;
        std::fs::write(&self.session_path, content)
            .with_context(|| format!("Failed to write session file {:?}", self.session_path))?;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_credentials(email: &str, password: &str) -> Result<(), String> {
    if email.is_empty() || password.is_empty() {
        return Err("email and password are required".to_string());
    }
    if !email.contains('@') {
        return Err("invalid email address".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> AuthService<SqliteStore> {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        AuthService::new(store, AuthContext::new(), dir.path().join("session.json"))
    }

    #[test]
    fn test_sign_up_signs_in() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        let login = auth.subscribe_login();

        assert!(auth.sign_up("reader@example.com", "hunter22"));
        assert!(auth.context.is_signed_in());
        assert!(login.borrow().is_success());
        assert!(dir.path().join("session.json").exists());
    }

    #[test]
    fn test_sign_up_duplicate_email_fails() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        assert!(auth.sign_up("reader@example.com", "hunter22"));
        auth.sign_out();

        let login = auth.subscribe_login();
        assert!(!auth.sign_up("reader@example.com", "other-password"));
        assert!(login.borrow().is_error());
        assert!(!auth.context.is_signed_in());
    }

    #[test]
    fn test_sign_up_validation_rejected_before_io() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        let login = auth.subscribe_login();

        assert!(!auth.sign_up("", "hunter22"));
        assert!(login.borrow().is_error());

        assert!(!auth.sign_up("not-an-email", "hunter22"));
        assert_eq!(
            login.borrow().error_message(),
            Some("invalid email address")
        );

        assert!(!auth.sign_up("reader@example.com", "short"));
        assert!(login.borrow().is_error());

        // Nothing was written for any of the rejected attempts
        assert_eq!(
            auth.store.get("accounts/reader@example.com").unwrap(),
            None
        );
    }

    #[test]
    fn test_sign_in_round_trip() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        assert!(auth.sign_up("reader@example.com", "hunter22"));
        let uid = auth.context.current_uid().unwrap();
        auth.sign_out();

        assert!(auth.sign_in("reader@example.com", "hunter22"));
        assert_eq!(auth.context.current_uid(), Some(uid));
    }

    #[test]
    fn test_sign_in_wrong_password_is_generic() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        auth.sign_up("reader@example.com", "hunter22");
        auth.sign_out();

        let login = auth.subscribe_login();
        assert!(!auth.sign_in("reader@example.com", "wrong-pass"));
        assert_eq!(
            login.borrow().error_message(),
            Some("invalid email or password")
        );

        // Unknown accounts produce the same message
        assert!(!auth.sign_in("nobody@example.com", "hunter22"));
        assert_eq!(
            login.borrow().error_message(),
            Some("invalid email or password")
        );
    }

    #[test]
    fn test_sign_out_clears_session() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);
        let login = auth.subscribe_login();

        auth.sign_up("reader@example.com", "hunter22");
        auth.sign_out();

        assert!(!auth.context.is_signed_in());
        assert!(!dir.path().join("session.json").exists());
        assert_eq!(*login.borrow(), ActionState::Initial);
    }

    #[test]
    fn test_restore_session() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let session_path = dir.path().join("session.json");

        let first = AuthService::new(
            Arc::clone(&store),
            AuthContext::new(),
            session_path.clone(),
        );
        first.sign_up("reader@example.com", "hunter22");
        let uid = first.context.current_uid().unwrap();

        // A fresh process: new context, same session file
        let second = AuthService::new(store, AuthContext::new(), session_path);
        let restored = second.restore_session().unwrap();

        assert_eq!(restored.uid, uid);
        assert_eq!(restored.email, "reader@example.com");
        assert_eq!(second.context.current_uid(), Some(uid));
    }

    #[test]
    fn test_restore_without_session_file() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        assert!(auth.restore_session().is_none());
        assert!(!auth.context.is_signed_in());
    }

    #[test]
    fn test_email_is_normalized() {
        let dir = TempDir::new().unwrap();
        let auth = service(&dir);

        assert!(auth.sign_up("  Reader@Example.COM ", "hunter22"));
        auth.sign_out();

        assert!(auth.sign_in("reader@example.com", "hunter22"));
    }

    #[test]
    fn test_hash_password_depends_on_salt() {
        let a = hash_password("salt-1", "password");
        let b = hash_password("salt-2", "password");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("salt-1", "password"));
    }
}
