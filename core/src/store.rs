//! The capability the rest of the crate needs from a todo backend.
//!
//! `TodoApi` implements it over HTTP. The sync layer and view model only see
//! this trait, so a presentation can be driven against any backend.

use std::future::Future;

use crate::error::ApiError;
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo};

pub trait TodoStore: Send + Sync {
    fn create(&self, input: CreateTodo) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    /// Whole collection in server order.
    fn list(&self) -> impl Future<Output = Result<Vec<Todo>, ApiError>> + Send;

    fn get_one(&self, id: TodoId) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    fn update(&self, id: TodoId, patch: UpdateTodo) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    fn delete(&self, id: TodoId) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn batch_update(
        &self,
        ids: &[TodoId],
        patch: UpdateTodo,
    ) -> impl Future<Output = BatchReport<Todo>> + Send;

    fn batch_delete(&self, ids: &[TodoId]) -> impl Future<Output = BatchReport<()>> + Send;
}

/// Per-id outcome of a fan-out operation. Members are independent: there is
/// no atomicity across the set and nothing is rolled back.
#[derive(Debug)]
pub struct BatchReport<T> {
    outcomes: Vec<(TodoId, Result<T, ApiError>)>,
}

impl<T> BatchReport<T> {
    /// Outcomes must be in the order the ids were requested.
    pub fn new(outcomes: Vec<(TodoId, Result<T, ApiError>)>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[(TodoId, Result<T, ApiError>)] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<(TodoId, Result<T, ApiError>)> {
        self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> Vec<TodoId> {
        self.outcomes
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn failed(&self) -> Vec<(TodoId, &ApiError)> {
        self.outcomes
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (*id, e)))
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, r)| r.is_ok())
    }

    pub fn any_succeeded(&self) -> bool {
        self.outcomes.iter().any(|(_, r)| r.is_ok())
    }
}

impl BatchReport<()> {
    /// Ids that are gone after a batch delete: deleted now, or already absent.
    pub fn removed(&self) -> Vec<TodoId> {
        self.outcomes
            .iter()
            .filter(|(_, r)| match r {
                Ok(()) => true,
                Err(e) => e.is_not_found(),
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Failures that left the todo in place. An id that was already absent
    /// is not one of them.
    pub fn failed_removals(&self) -> Vec<(TodoId, &ApiError)> {
        self.failed()
            .into_iter()
            .filter(|(_, e)| !e.is_not_found())
            .collect()
    }
}
