//! Keeps the cached todo collection consistent with the remote store.
//!
//! # Design
//! Nothing is patched locally. A mutation goes to the store; on success the
//! `Todos` key is invalidated and the whole collection is fetched again, on
//! failure the cache is left exactly as it was and the error goes back to
//! the caller. Concurrent mutations are independent and the rendered state
//! is whatever the next full fetch returns.
//!
//! `TodoSync` is a cheap handle: clone it and pass it to whatever renders.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::cache::{QueryCache, QueryKey, Settled, StalePolicy};
use crate::error::ApiError;
use crate::store::{BatchReport, TodoStore};
use crate::types::{Todo, TodoId, UpdateTodo};
use crate::validation::{TodoForm, ValidationError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The todo is not in the cached collection, so there is no current state
    /// to base the mutation on.
    #[error("todo {0} is not in the current list")]
    UnknownTodo(TodoId),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncConfig {
    pub stale_policy: StalePolicy,
}

pub struct TodoSync<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    store: S,
    cache: RwLock<QueryCache>,
    config: SyncConfig,
    applied: watch::Sender<u64>,
}

impl<S> Clone for TodoSync<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: TodoStore> TodoSync<S> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        let (applied, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                store,
                cache: RwLock::new(QueryCache::new()),
                config,
                applied,
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn config(&self) -> SyncConfig {
        self.inner.config
    }

    /// Yields the generation of every fetch that lands in the cache. Treat a
    /// change as "re-render from `snapshot`".
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.applied.subscribe()
    }

    /// Last fetched collection without soft-deleted items, in server order.
    /// `None` until the first fetch lands.
    pub async fn snapshot(&self) -> Option<Vec<Todo>> {
        let cache = self.inner.cache.read().await;
        cache
            .data(QueryKey::Todos)
            .map(|todos| todos.iter().filter(|t| !t.is_deleted()).cloned().collect())
    }

    pub async fn find(&self, id: TodoId) -> Option<Todo> {
        let cache = self.inner.cache.read().await;
        cache
            .data(QueryKey::Todos)?
            .iter()
            .find(|t| t.id == id && !t.is_deleted())
            .cloned()
    }

    pub async fn is_stale(&self, key: QueryKey) -> bool {
        self.inner.cache.read().await.needs_fetch(key)
    }

    pub async fn invalidate(&self, key: QueryKey) {
        debug!(%key, "invalidating query");
        self.inner.cache.write().await.invalidate(key);
    }

    /// Fetch `key` again. A failure leaves the previous data in place.
    pub async fn refetch(&self, key: QueryKey) -> Result<Settled, ApiError> {
        let generation = self.inner.cache.write().await.issue(key);
        let todos = match key {
            QueryKey::Todos => self.inner.store.list().await,
        }
        .inspect_err(|e| warn!(%key, generation, error = %e, "refetch failed"))?;

        let settled = self.inner.cache.write().await.settle(
            key,
            generation,
            todos,
            self.inner.config.stale_policy,
        );
        match settled {
            Settled::Applied => {
                self.inner.applied.send_replace(generation);
            }
            Settled::Discarded => {
                debug!(%key, generation, "discarded response older than cached data");
            }
        }
        Ok(settled)
    }

    /// Fetch on mount: only when nothing is cached yet or it went stale.
    pub async fn ensure_fresh(&self) -> Result<(), ApiError> {
        if self.is_stale(QueryKey::Todos).await {
            self.refetch(QueryKey::Todos).await?;
        }
        Ok(())
    }

    pub async fn create(&self, form: &TodoForm) -> Result<Todo, SyncError> {
        let input = form.to_create()?;
        let todo = self
            .inner
            .store
            .create(input)
            .await
            .inspect_err(|e| log_rejected("create", None, e))?;
        self.after_mutation().await;
        Ok(todo)
    }

    /// Save an edit. Title and description are replaced; completion keeps the
    /// value currently shown.
    pub async fn update(&self, id: TodoId, form: &TodoForm) -> Result<Todo, SyncError> {
        form.validate()?;
        let current = self.find(id).await.ok_or(SyncError::UnknownTodo(id))?;
        let patch = form.to_update(current.completed)?;
        let todo = self
            .inner
            .store
            .update(id, patch)
            .await
            .inspect_err(|e| log_rejected("update", Some(id), e))?;
        self.after_mutation().await;
        Ok(todo)
    }

    pub async fn set_completed(&self, id: TodoId, completed: bool) -> Result<Todo, SyncError> {
        let todo = self
            .inner
            .store
            .update(id, UpdateTodo::completed(completed))
            .await
            .inspect_err(|e| log_rejected("set_completed", Some(id), e))?;
        self.after_mutation().await;
        Ok(todo)
    }

    /// Flip completion relative to the cached copy.
    pub async fn toggle(&self, id: TodoId) -> Result<Todo, SyncError> {
        let current = self.find(id).await.ok_or(SyncError::UnknownTodo(id))?;
        self.set_completed(id, !current.completed).await
    }

    /// A todo that is already gone counts as deleted.
    pub async fn delete(&self, id: TodoId) -> Result<(), SyncError> {
        match self.inner.store.delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(id, "todo already absent on delete");
            }
            Err(e) => {
                log_rejected("delete", Some(id), &e);
                return Err(e.into());
            }
        }
        self.after_mutation().await;
        Ok(())
    }

    pub async fn batch_delete(&self, ids: &[TodoId]) -> BatchReport<()> {
        let report = self.inner.store.batch_delete(ids).await;
        for (id, err) in report.failed() {
            if !err.is_not_found() {
                log_rejected("batch_delete", Some(id), err);
            }
        }
        if !report.removed().is_empty() {
            self.after_mutation().await;
        }
        report
    }

    pub async fn batch_update(&self, ids: &[TodoId], patch: UpdateTodo) -> BatchReport<Todo> {
        let report = self.inner.store.batch_update(ids, patch).await;
        for (id, err) in report.failed() {
            log_rejected("batch_update", Some(id), err);
        }
        if report.any_succeeded() {
            self.after_mutation().await;
        }
        report
    }

    async fn after_mutation(&self) {
        self.invalidate(QueryKey::Todos).await;
        // The mutation already happened; a failed refetch only leaves the
        // entry stale for the next `ensure_fresh`.
        let _ = self.refetch(QueryKey::Todos).await;
    }
}

fn log_rejected(op: &str, id: Option<TodoId>, err: &ApiError) {
    warn!(op, ?id, error = %err, "mutation failed, cached todos left untouched");
}
