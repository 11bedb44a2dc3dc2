use thiserror::Error;
use todo_core::{ApiError, LocaleError, SyncError};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Unknown locale segment: the not-found page, not the todo UI.
    #[error("{0}")]
    Locale(#[from] LocaleError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// At least one member of a batch failed.
    #[error("{failed} of {total} batch requests failed")]
    Batch { failed: usize, total: usize },
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Locale(_) => 2,
            Self::Sync(SyncError::Validation(_)) => 3,
            _ => 1,
        }
    }
}
