//! JSON-backed user account store.
//!
//! Document: `users.json`, an array of
//! `{ id, displayName, email, passwordHash, salt }` in registration order.

use crate::storage::{load_with_ids, Committed, IdCounter, JsonDocument, LoadStatus};
use base64::Engine;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Salt byte length before base64 encoding.
const SALT_BYTES: usize = 16;

/// Salt used for the dummy digest on unknown emails.
const DUMMY_SALT: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

/// Persisted user record. Only this module sees the hash and salt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(alias = "Id")]
    id: u64,
    #[serde(default, alias = "DisplayName")]
    display_name: String,
    #[serde(default, alias = "Email")]
    email: String,
    #[serde(default, alias = "PasswordHash")]
    password_hash: String,
    #[serde(default, alias = "Salt")]
    salt: String,
}

/// A registered user as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub display_name: String,
    pub email: String,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name.clone(),
            email: record.email.clone(),
        }
    }
}

/// Why a registration was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("Email cannot be empty")]
    EmptyEmail,
    #[error("Password cannot be empty")]
    EmptyPassword,
    #[error("Email '{0}' is already registered")]
    EmailTaken(String),
    #[error("No user ids left to assign")]
    IdsExhausted,
}

struct Accounts {
    users: Vec<UserRecord>,
    next_id: IdCounter,
}

/// Account store backed by a single JSON document.
pub struct AccountStore {
    document: JsonDocument,
    state: Mutex<Accounts>,
    load_status: LoadStatus,
}

impl AccountStore {
    /// Open the store at `path`, loading whatever is on disk.
    pub fn open(path: &Path) -> Self {
        let document = JsonDocument::new(path);
        let (users, next_id, load_status) = load_with_ids(&document, |u: &UserRecord| u.id);

        tracing::info!(
            path = %path.display(),
            users = users.len(),
            next_id = ?next_id.peek(),
            "Account store opened"
        );

        Self {
            document,
            state: Mutex::new(Accounts { users, next_id }),
            load_status,
        }
    }

    /// Outcome of the initial load.
    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    // ── Registration & Login ────────────────────────────────────────

    /// Register a new user. Returns the assigned user id.
    pub fn register(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Committed<u64>, RegisterError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(RegisterError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(RegisterError::EmptyPassword);
        }

        let mut state = self.state.lock();
        if state.users.iter().any(|u| u.email == email) {
            return Err(RegisterError::EmailTaken(email));
        }

        let id = state
            .next_id
            .allocate()
            .ok_or(RegisterError::IdsExhausted)?;
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt);

        state.users.push(UserRecord {
            id,
            display_name: display_name.to_string(),
            email,
            password_hash,
            salt,
        });
        let save = self.document.save(&state.users);

        tracing::info!(user_id = id, "User registered");
        Ok(Committed::new(id, save))
    }

    /// Verify credentials. Returns `None` for an unknown email or wrong password.
    pub fn login(&self, email: &str, password: &str) -> Option<User> {
        let email = normalize_email(email);
        let state = self.state.lock();

        let Some(record) = state.users.iter().find(|u| u.email == email) else {
            // Same amount of work as a real check
            std::hint::black_box(hash_password(password, DUMMY_SALT));
            tracing::debug!("Login rejected: unknown email");
            return None;
        };

        let attempt = hash_password(password, &record.salt);
        if !constant_time_eq(attempt.as_bytes(), record.password_hash.as_bytes()) {
            tracing::debug!(user_id = record.id, "Login rejected: wrong password");
            return None;
        }

        tracing::info!(user_id = record.id, "User logged in");
        Some(User::from(record))
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// Look up a user by id.
    pub fn get_user(&self, user_id: u64) -> Option<User> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(User::from)
    }

    /// All users in registration order.
    pub fn all_users(&self) -> Vec<User> {
        self.state.lock().users.iter().map(User::from).collect()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }
}

/// Normalize an email into its lookup key: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ── Cryptographic Helpers ───────────────────────────────────────────

/// Generate a random salt (base64-encoded).
fn generate_salt() -> String {
    let bytes: [u8; SALT_BYTES] = rand::random();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// SHA-256 over `password ++ salt`, base64-encoded.
fn hash_password(password: &str, salt: &str) -> String {
    let mut h = Sha256::new();
    h.update(password.as_bytes());
    h.update(salt.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(h.finalize())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ── Tests ───────────────────────────────────────────────────────────
