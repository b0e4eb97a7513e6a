//! Application facade: both stores opened from one [`Config`], plus the
//! session a successful login produces.
//!
//! A UI layer (pages, forms, bindings) holds one `TodoApp` for the process
//! lifetime, signs the user in, and scopes every todo call to the session's
//! user id.

use crate::auth::AccountStore;
use crate::config::Config;
use crate::storage::LoadStatus;
use crate::todo::{TodoItem, TodoStore};
use anyhow::{Context, Result};

/// An authenticated user, as held by the UI between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: u64,
    pub display_name: String,
    pub email: String,
}

pub struct TodoApp {
    accounts: AccountStore,
    todos: TodoStore,
}

impl TodoApp {
    /// Create the data directory if needed and open both stores.
    pub fn open(config: &Config) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data dir: {}", config.data_dir.display())
        })?;

        let accounts = AccountStore::open(&config.users_path());
        let todos = TodoStore::open(&config.todos_path());

        for (name, status) in [
            ("users", accounts.load_status()),
            ("todos", todos.load_status()),
        ] {
            if let LoadStatus::Recovered { reason } = status {
                tracing::warn!(document = name, %reason, "Started with an empty collection");
            }
        }

        Ok(Self { accounts, todos })
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn todos(&self) -> &TodoStore {
        &self.todos
    }

    /// Verify credentials and start a session.
    pub fn sign_in(&self, email: &str, password: &str) -> Option<Session> {
        self.accounts.login(email, password).map(|user| Session {
            user_id: user.id,
            display_name: user.display_name,
            email: user.email,
        })
    }

    /// The session user's todos, newest first.
    pub fn todos_for(&self, session: &Session) -> Vec<TodoItem> {
        self.todos.list_for_owner(session.user_id)
    }
}
