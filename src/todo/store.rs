//! JSON-backed todo store.
//!
//! Document: `todos.json`, an array of
//! `{ id, userId, title, description, createdAt, done }`.

use crate::storage::{load_with_ids, Committed, IdCounter, JsonDocument, LoadStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    #[serde(alias = "Id")]
    pub id: u64,
    /// Owning user id.
    #[serde(rename = "userId", alias = "UserId")]
    pub owner_id: u64,
    #[serde(default, alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
    #[serde(default = "Utc::now", alias = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "Done")]
    pub done: bool,
}

impl TodoItem {
    fn is_owned_by(&self, owner_id: u64) -> bool {
        self.owner_id == owner_id
    }
}

/// Why a todo could not be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("No todo ids left to assign")]
    IdsExhausted,
}

struct Todos {
    items: Vec<TodoItem>,
    next_id: IdCounter,
}

impl Todos {
    fn position(&self, id: u64, owner_id: u64) -> Option<usize> {
        self.items
            .iter()
            .position(|t| t.id == id && t.is_owned_by(owner_id))
    }
}

/// Todo store backed by a single JSON document.
pub struct TodoStore {
    document: JsonDocument,
    state: Mutex<Todos>,
    load_status: LoadStatus,
}

impl TodoStore {
    /// Open the store at `path`, loading whatever is on disk.
    pub fn open(path: &Path) -> Self {
        let document = JsonDocument::new(path);
        let (items, next_id, load_status) = load_with_ids(&document, |t: &TodoItem| t.id);

        tracing::info!(
            path = %path.display(),
            items = items.len(),
            next_id = ?next_id.peek(),
            "Todo store opened"
        );

        Self {
            document,
            state: Mutex::new(Todos { items, next_id }),
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

    /// Items of `owner_id`, newest first.
    pub fn list_for_owner(&self, owner_id: u64) -> Vec<TodoItem> {
        let state = self.state.lock();
        let mut items: Vec<TodoItem> = state
            .items
            .iter()
            .filter(|t| t.is_owned_by(owner_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        items
    }

    /// Look up one item, scoped to its owner.
    pub fn get(&self, id: u64, owner_id: u64) -> Option<TodoItem> {
        let state = self.state.lock();
        state.position(id, owner_id).map(|i| state.items[i].clone())
    }

    /// Create an item for `owner_id`. Returns the stored record.
    pub fn add(
        &self,
        owner_id: u64,
        title: &str,
        description: Option<&str>,
    ) -> Result<Committed<TodoItem>, TodoError> {
        let mut state = self.state.lock();
        let id = state.next_id.allocate().ok_or(TodoError::IdsExhausted)?;
        let item = TodoItem {
            id,
            owner_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
            done: false,
        };
        state.items.push(item.clone());
        let save = self.document.save(&state.items);

        tracing::debug!(todo_id = item.id, owner_id, "Todo added");
        Ok(Committed::new(item, save))
    }

    /// Remove an item. Returns `false` if no item with that id belongs to `owner_id`.
    pub fn delete(&self, id: u64, owner_id: u64) -> Committed<bool> {
        let mut state = self.state.lock();
        let Some(index) = state.position(id, owner_id) else {
            return Committed::unchanged(false);
        };

        state.items.remove(index);
        let save = self.document.save(&state.items);

        tracing::debug!(todo_id = id, owner_id, "Todo deleted");
        Committed::new(true, save)
    }

    /// Flip `done` on an item. Returns `false` if not found for `owner_id`.
    pub fn toggle_done(&self, id: u64, owner_id: u64) -> Committed<bool> {
        let mut state = self.state.lock();
        let Some(index) = state.position(id, owner_id) else {
            return Committed::unchanged(false);
        };

        let item = &mut state.items[index];
        item.done = !item.done;
        let done = item.done;
        let save = self.document.save(&state.items);

        tracing::debug!(todo_id = id, owner_id, done, "Todo toggled");
        Committed::new(true, save)
    }

    /// Remove every item of `owner_id`. Always rewrites the document.
    /// Returns the number of items removed.
    pub fn clear_for_owner(&self, owner_id: u64) -> Committed<usize> {
        let mut state = self.state.lock();
        let before = state.items.len();
        state.items.retain(|t| !t.is_owned_by(owner_id));
        let removed = before - state.items.len();
        let save = self.document.save(&state.items);

        tracing::info!(owner_id, removed, "Todos cleared");
        Committed::new(removed, save)
    }

    /// Total items across all owners.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
