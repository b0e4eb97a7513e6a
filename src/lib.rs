#![forbid(unsafe_code)]

//! Local-first personal todo list.
//!
//! Two independent stores, each backed by one pretty-printed JSON document:
//! - [`auth::AccountStore`]: registration and login with salted SHA-256 digests
//! - [`todo::TodoStore`]: per-user todo items with owner-scoped mutations
//!
//! [`app::TodoApp`] opens both from a [`config::Config`] for a UI or CLI host.

pub mod app;
pub mod auth;
pub mod config;
pub mod storage;
pub mod todo;

pub use app::{Session, TodoApp};
pub use auth::{AccountStore, RegisterError, User};
pub use config::Config;
pub use storage::{Committed, LoadStatus, SaveStatus};
pub use todo::{TodoError, TodoItem, TodoStore};
