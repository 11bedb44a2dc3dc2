//! In-memory `TodoStore` for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::store::{BatchReport, TodoStore};
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo};

pub(crate) fn todo(id: TodoId, title: &str, completed: bool) -> Todo {
    let now = Utc::now();
    Todo {
        id,
        title: title.to_string(),
        description: String::new(),
        completed,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    inner: Arc<State>,
}

#[derive(Default)]
struct State {
    todos: Mutex<Vec<Todo>>,
    calls: AtomicUsize,
    fail_next: Mutex<Option<u16>>,
    fail_lists: AtomicBool,
    held_lists: Mutex<VecDeque<(oneshot::Receiver<()>, Vec<Todo>)>>,
}

impl MemoryStore {
    pub(crate) fn with(todos: Vec<Todo>) -> Self {
        let store = Self::default();
        *store.inner.todos.lock().unwrap() = todos;
        store
    }

    /// Number of store calls made so far, lists included.
    pub(crate) fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// The next mutating call answers with `status` instead of succeeding.
    pub(crate) fn fail_next(&self, status: u16) {
        *self.inner.fail_next.lock().unwrap() = Some(status);
    }

    pub(crate) fn fail_lists(&self, fail: bool) {
        self.inner.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// The next `list` call blocks until the returned sender fires and then
    /// answers with `todos`.
    pub(crate) fn hold_next_list(&self, todos: Vec<Todo>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.inner.held_lists.lock().unwrap().push_back((rx, todos));
        tx
    }

    fn enter(&self) -> Result<(), ApiError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.fail_next.lock().unwrap().take() {
            Some(404) => Err(ApiError::NotFound),
            Some(status) => Err(ApiError::Request {
                method: HttpMethod::Put,
                url: "memory://todos".to_string(),
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

impl TodoStore for MemoryStore {
    async fn create(&self, input: CreateTodo) -> Result<Todo, ApiError> {
        self.enter()?;
        let mut todos = self.inner.todos.lock().unwrap();
        let id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let mut created = todo(id, &input.title, false);
        created.description = input.description;
        todos.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let held = self.inner.held_lists.lock().unwrap().pop_front();
        if let Some((gate, todos)) = held {
            let _ = gate.await;
            return Ok(todos);
        }
        if self.inner.fail_lists.load(Ordering::SeqCst) {
            return Err(ApiError::Transport {
                method: HttpMethod::Get,
                url: "memory://todos".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.inner.todos.lock().unwrap().clone())
    }

    async fn get_one(&self, id: TodoId) -> Result<Todo, ApiError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let todos = self.inner.todos.lock().unwrap();
        todos.iter().find(|t| t.id == id).cloned().ok_or(ApiError::NotFound)
    }

    async fn update(&self, id: TodoId, patch: UpdateTodo) -> Result<Todo, ApiError> {
        self.enter()?;
        let mut todos = self.inner.todos.lock().unwrap();
        let todo = todos.iter_mut().find(|t| t.id == id).ok_or(ApiError::NotFound)?;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        todo.updated_at = Utc::now();
        Ok(todo.clone())
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        self.enter()?;
        let mut todos = self.inner.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        if todos.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn batch_update(&self, ids: &[TodoId], patch: UpdateTodo) -> BatchReport<Todo> {
        let results = join_all(ids.iter().map(|&id| self.update(id, patch.clone()))).await;
        BatchReport::new(ids.iter().copied().zip(results).collect())
    }

    async fn batch_delete(&self, ids: &[TodoId]) -> BatchReport<()> {
        let results = join_all(ids.iter().map(|&id| self.delete(id))).await;
        BatchReport::new(ids.iter().copied().zip(results).collect())
    }
}
