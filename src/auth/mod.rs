//! User account module: registration and credential verification.
//!
//! Provides:
//! - Registration keyed by normalized email (trimmed, lower-cased)
//! - Salted SHA-256 password digests (16-byte random salt per user)
//! - Login returning a redacted [`User`] view; hash and salt never leave the store
//! - JSON-backed persistence in `users.json`

pub mod store;

pub use store::{normalize_email, AccountStore, RegisterError, User};
