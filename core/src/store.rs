//! In-memory todo state for one session.
//!
//! # Design
//! `TodoStore` is the single owner of the todo list. Every mutation goes
//! through the injected `TodoTransport`; local state changes only after the
//! call settles, inside one `watch` critical section, so readers never see a
//! half-applied operation and no lock is ever held across an `.await`.
//!
//! The state lives in a `tokio::sync::watch` channel: `snapshot()` reads it,
//! `subscribe()` hands the view layer a receiver that wakes on every change.
//!
//! Mutations are not serialized against each other. Two concurrent updates of
//! the same id resolve last-settled-wins. Loads are the exception: each load
//! takes a generation number and only the most recently issued one may
//! replace the list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{RestTransport, TodoTransport};
use crate::types::{CreateTodo, Todo, TodoStatistics, UpdateTodo};
use crate::view::{filter_and_search, StatusFilter};

/// Everything the view layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub todos: Vec<Todo>,
    /// True while the most recently issued load is unresolved.
    pub loading: bool,
    /// Message of the most recent failure, until cleared or superseded by a
    /// success.
    pub error: Option<String>,
}

pub struct TodoStore {
    transport: Arc<dyn TodoTransport>,
    state: watch::Sender<StoreSnapshot>,
    load_generation: AtomicU64,
}

impl TodoStore {
    pub fn new(transport: Arc<dyn TodoTransport>) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self {
            transport,
            state,
            load_generation: AtomicU64::new(0),
        }
    }

    /// Store talking REST to `config.base_url`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(RestTransport::from_config(config)?)))
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.state.borrow().todos.clone()
    }

    pub fn get(&self, id: u64) -> Option<Todo> {
        self.state.borrow().todos.iter().find(|t| t.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn statistics(&self) -> TodoStatistics {
        TodoStatistics::from_todos(&self.state.borrow().todos)
    }

    /// Todos matching `filter` and containing `term`, in list order.
    pub fn visible(&self, filter: StatusFilter, term: &str) -> Vec<Todo> {
        let state = self.state.borrow();
        let visible = filter_and_search(&state.todos, filter, term)
            .into_iter()
            .cloned()
            .collect();
        visible
    }

    /// Replace the list with the service's. On failure the list is kept.
    pub async fn load_todos(&self) -> Result<(), ApiError> {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_if_modified(|s| !std::mem::replace(&mut s.loading, true));

        let result = self.transport.list().await;

        let applied = self.state.send_if_modified(|s| {
            if self.load_generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            s.loading = false;
            match &result {
                Ok(todos) => {
                    s.todos = todos.clone();
                    s.error = None;
                }
                Err(err) => s.error = Some(err.to_string()),
            }
            true
        });

        match result {
            Ok(todos) => {
                if applied {
                    debug!(count = todos.len(), generation, "loaded todos");
                } else {
                    debug!(generation, "discarded stale load");
                }
                Ok(())
            }
            Err(err) => {
                warn!(operation = "load", error = %err, stale = !applied, "todo operation failed");
                Err(err)
            }
        }
    }

    /// Create through the service and append the returned todo.
    pub async fn add_todo(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let todo = self
            .transport
            .create(input)
            .await
            .map_err(|err| self.fail("add", err))?;

        self.state.send_modify(|s| {
            s.error = None;
            // A load may already have brought this id in.
            match s.todos.iter_mut().find(|t| t.id == todo.id) {
                Some(existing) => *existing = todo.clone(),
                None => s.todos.push(todo.clone()),
            }
        });
        debug!(id = todo.id, "added todo");
        Ok(todo)
    }

    /// Patch through the service and adopt its representation.
    pub async fn update_todo(&self, id: u64, patch: &UpdateTodo) -> Result<Todo, ApiError> {
        let todo = self
            .transport
            .update(id, patch)
            .await
            .map_err(|err| self.fail("update", err))?;

        let mut found = false;
        self.state.send_modify(|s| {
            s.error = None;
            if let Some(existing) = s.todos.iter_mut().find(|t| t.id == id) {
                *existing = todo.clone();
                found = true;
            }
        });
        if found {
            debug!(id, "updated todo");
        } else {
            warn!(id, "updated todo is not in the local list; leaving list unchanged");
        }
        Ok(todo)
    }

    /// Delete through the service and drop the local entry.
    pub async fn delete_todo(&self, id: u64) -> Result<Option<Todo>, ApiError> {
        let echoed = self
            .transport
            .delete(id)
            .await
            .map_err(|err| self.fail("delete", err))?;

        self.state.send_modify(|s| {
            s.error = None;
            s.todos.retain(|t| t.id != id);
        });
        debug!(id, "deleted todo");
        Ok(echoed)
    }

    /// Flip `completed` for a locally known todo. Unknown ids are a no-op
    /// that never reaches the service and yields `Ok(None)`.
    pub async fn toggle_todo(&self, id: u64) -> Result<Option<Todo>, ApiError> {
        let current = self
            .state
            .borrow()
            .todos
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.completed);
        let Some(completed) = current else {
            debug!(id, "toggle ignored for unknown id");
            return Ok(None);
        };
        self.update_todo(id, &UpdateTodo::completed(!completed))
            .await
            .map(Some)
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    fn fail(&self, operation: &'static str, err: ApiError) -> ApiError {
        warn!(operation, error = %err, "todo operation failed");
        let message = err.to_string();
        self.state.send_modify(|s| s.error = Some(message));
        err
    }
}
