//! Presentation-independent list and item view model.
//!
//! `TodoListView` is what a renderer drives: it owns the UI-only state
//! (active tab, selection, edit flags, the creation form) and routes every
//! user action through a `TodoSync` handle. What it shows always comes from
//! the sync cache; nothing here is sent to the server or persisted.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::store::{BatchReport, TodoStore};
use crate::sync::{SyncError, TodoSync};
use crate::types::{Todo, TodoId, UpdateTodo};
use crate::validation::{TodoForm, ValidationError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Uncompleted,
    Completed,
}

impl Tab {
    pub fn label_key(self) -> &'static str {
        match self {
            Tab::Uncompleted => "todo.tabs.uncompleted",
            Tab::Completed => "todo.tabs.completed",
        }
    }

    /// Catalog prefix of the message shown when the tab is empty.
    pub fn empty_key(self) -> &'static str {
        match self {
            Tab::Uncompleted => "todo.emptyState",
            Tab::Completed => "todo.noCompleted",
        }
    }

    fn holds(self, todo: &Todo) -> bool {
        match self {
            Tab::Uncompleted => !todo.completed,
            Tab::Completed => todo.completed,
        }
    }
}

/// Count badges of the two tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabCounts {
    pub uncompleted: usize,
    pub completed: usize,
}

/// Split into (uncompleted, completed), keeping server order in each.
pub fn partition(todos: &[Todo]) -> (Vec<Todo>, Vec<Todo>) {
    todos
        .iter()
        .filter(|t| !t.is_deleted())
        .cloned()
        .partition(|t| !t.completed)
}

pub fn counts(todos: &[Todo]) -> TabCounts {
    todos
        .iter()
        .filter(|t| !t.is_deleted())
        .fold(TabCounts::default(), |mut c, t| {
            if t.completed {
                c.completed += 1;
            } else {
                c.uncompleted += 1;
            }
            c
        })
}

/// Ids picked for a batch operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<TodoId>,
}

impl Selection {
    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: TodoId) -> bool {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
            return true;
        }
        false
    }

    pub fn select(&mut self, id: TodoId) {
        self.ids.insert(id);
    }

    pub fn select_all(&mut self, todos: &[Todo]) {
        self.ids.extend(todos.iter().map(|t| t.id));
    }

    pub fn remove(&mut self, id: TodoId) {
        self.ids.remove(&id);
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<TodoId> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Notified when a toggle moves a todo into the completed tab. Used for
/// decorative effects; the mutation never waits on or depends on it.
pub trait CompletionHook: Send + Sync {
    fn on_completed(&self, todo: &Todo);
}

/// One item currently being edited inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: TodoId,
    pub form: TodoForm,
    pub error: Option<ValidationError>,
}

pub struct TodoListView<S> {
    sync: TodoSync<S>,
    tab: Tab,
    selection: Selection,
    editing: Vec<EditSession>,
    new_form: TodoForm,
    new_form_error: Option<ValidationError>,
    hook: Option<Arc<dyn CompletionHook>>,
}

impl<S: TodoStore> TodoListView<S> {
    pub fn new(sync: TodoSync<S>) -> Self {
        Self {
            sync,
            tab: Tab::default(),
            selection: Selection::default(),
            editing: Vec::new(),
            new_form: TodoForm::default(),
            new_form_error: None,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn CompletionHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn sync(&self) -> &TodoSync<S> {
        &self.sync
    }

    /// Fetch on mount or when the view becomes active again.
    pub async fn activate(&self) -> Result<(), SyncError> {
        Ok(self.sync.ensure_fresh().await?)
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// True until the first list response lands in the cache.
    pub async fn is_loading(&self) -> bool {
        self.sync.snapshot().await.is_none()
    }

    pub async fn counts(&self) -> TabCounts {
        counts(&self.sync.snapshot().await.unwrap_or_default())
    }

    /// Items of the active tab.
    pub async fn visible(&self) -> Vec<Todo> {
        let todos = self.sync.snapshot().await.unwrap_or_default();
        todos.into_iter().filter(|t| self.tab.holds(t)).collect()
    }

    pub fn new_form(&self) -> &TodoForm {
        &self.new_form
    }

    pub fn new_form_mut(&mut self) -> &mut TodoForm {
        &mut self.new_form
    }

    pub fn new_form_error(&self) -> Option<ValidationError> {
        self.new_form_error
    }

    /// Submit the creation form. It is cleared only when the todo was
    /// created; otherwise it stays as typed.
    pub async fn submit_new(&mut self) -> Result<Todo, SyncError> {
        match self.sync.create(&self.new_form).await {
            Ok(todo) => {
                self.new_form.reset();
                self.new_form_error = None;
                Ok(todo)
            }
            Err(SyncError::Validation(e)) => {
                self.new_form_error = Some(e);
                Err(e.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Flip completion. The hook fires only when the todo ends up completed.
    pub async fn toggle(&self, id: TodoId) -> Result<Todo, SyncError> {
        let todo = self.sync.toggle(id).await?;
        if todo.completed {
            if let Some(hook) = &self.hook {
                hook.on_completed(&todo);
            }
        }
        Ok(todo)
    }

    pub async fn delete(&mut self, id: TodoId) -> Result<(), SyncError> {
        self.sync.delete(id).await?;
        self.selection.remove(id);
        self.editing.retain(|s| s.id != id);
        Ok(())
    }

    pub fn is_editing(&self, id: TodoId) -> bool {
        self.editing.iter().any(|s| s.id == id)
    }

    pub fn edit_session(&self, id: TodoId) -> Option<&EditSession> {
        self.editing.iter().find(|s| s.id == id)
    }

    pub fn edit_form_mut(&mut self, id: TodoId) -> Option<&mut TodoForm> {
        self.editing.iter_mut().find(|s| s.id == id).map(|s| &mut s.form)
    }

    /// Enter edit mode with the form seeded from the cached todo.
    pub async fn begin_edit(&mut self, id: TodoId) -> Result<(), SyncError> {
        if self.is_editing(id) {
            return Ok(());
        }
        let todo = self.sync.find(id).await.ok_or(SyncError::UnknownTodo(id))?;
        self.editing.push(EditSession {
            id,
            form: TodoForm::new(todo.title, todo.description),
            error: None,
        });
        Ok(())
    }

    /// Leave edit mode without saving. No request is made.
    pub fn cancel_edit(&mut self, id: TodoId) {
        self.editing.retain(|s| s.id != id);
    }

    /// Save the edit form. Edit mode ends only when the update succeeded.
    pub async fn commit_edit(&mut self, id: TodoId) -> Result<Todo, SyncError> {
        let form = self
            .edit_session(id)
            .map(|s| s.form.clone())
            .ok_or(SyncError::UnknownTodo(id))?;
        match self.sync.update(id, &form).await {
            Ok(todo) => {
                self.cancel_edit(id);
                Ok(todo)
            }
            Err(e) => {
                if let (SyncError::Validation(v), Some(session)) =
                    (&e, self.editing.iter_mut().find(|s| s.id == id))
                {
                    session.error = Some(*v);
                }
                Err(e)
            }
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Delete every selected todo. After a fully successful run the selection
    /// is empty; ids that failed stay selected.
    pub async fn delete_selected(&mut self) -> BatchReport<()> {
        let ids = self.selection.ids();
        let report = self.sync.batch_delete(&ids).await;
        let removed = report.removed();
        if report.all_succeeded() {
            self.selection.clear();
        } else {
            for id in &removed {
                self.selection.remove(*id);
            }
        }
        self.editing.retain(|s| !removed.contains(&s.id));
        report
    }

    /// Set completion on every selected todo. The selection is kept.
    pub async fn set_selected_completed(&mut self, completed: bool) -> BatchReport<Todo> {
        let ids = self.selection.ids();
        self.sync
            .batch_update(&ids, UpdateTodo::completed(completed))
            .await
    }
}
