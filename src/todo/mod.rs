//! Per-user todo storage.
//!
//! Every item belongs to exactly one owner (a user id). Mutations take the
//! owner id alongside the item id and act only when both match the same
//! record; that check is the only access control there is.

pub mod store;

pub use store::{TodoError, TodoItem, TodoStore};
