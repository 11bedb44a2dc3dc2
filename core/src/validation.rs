//! Client-side form validation. Runs before any request is built.

use thiserror::Error;

use crate::types::{CreateTodo, UpdateTodo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,
}

impl ValidationError {
    /// Catalog key of the inline message shown beside the field.
    pub fn message_key(self) -> &'static str {
        match self {
            ValidationError::TitleRequired => "todo.newTodo.titleRequired",
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            ValidationError::TitleRequired => "title",
        }
    }
}

/// Title and description as typed into the create or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
}

impl TodoForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// The title must be at least one character long. It is not trimmed, so a
    /// whitespace-only title passes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        Ok(())
    }

    pub fn to_create(&self) -> Result<CreateTodo, ValidationError> {
        self.validate()?;
        Ok(CreateTodo {
            title: self.title.clone(),
            description: self.description.clone(),
        })
    }

    /// Full-replace update that keeps the given completion state.
    pub fn to_update(&self, completed: bool) -> Result<UpdateTodo, ValidationError> {
        self.validate()?;
        Ok(UpdateTodo::full(
            self.title.clone(),
            self.description.clone(),
            completed,
        ))
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}
