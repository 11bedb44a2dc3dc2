//! Client core for the todo service.
//!
//! # Overview
//! Talks to a remote REST store of todos and keeps a client-side copy of the
//! collection consistent with it. The remote store is authoritative: every
//! successful mutation invalidates the cached collection and fetches it
//! again, and nothing is applied optimistically.
//!
//! # Design
//! - `TodoClient` is stateless and does no I/O: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes the `HttpResponse`.
//! - A `Transport` executes requests; `TodoApi` glues the two together and
//!   implements the `TodoStore` capability.
//! - `TodoSync` is the passed-down handle owning the query cache and the
//!   mutate → invalidate → refetch cycle.
//! - `TodoListView` is the presentation-independent list/item view model.
//! - `locale` resolves `en`/`zh` catalogs and formats dates in one fixed
//!   timezone.

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod locale;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;
pub mod validation;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use api::TodoApi;
pub use cache::{QueryCache, QueryKey, Settled, StalePolicy};
pub use client::{TodoClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use locale::{resolve_locale, Catalog, Locale, LocaleContext, LocaleError};
pub use store::{BatchReport, TodoStore};
pub use sync::{SyncConfig, SyncError, TodoSync};
pub use transport::{Transport, UreqTransport};
pub use types::{CreateTodo, Todo, TodoId, UpdateTodo};
pub use validation::{TodoForm, ValidationError};
pub use view::{CompletionHook, Selection, Tab, TabCounts, TodoListView};
