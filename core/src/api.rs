//! Async todo API over a `Transport`.
//!
//! # Design
//! Each call is a single round trip: `TodoClient::build_*`, then
//! `Transport::execute`, then `TodoClient::parse_*`. There is no retry,
//! backoff or timeout beyond what the transport does. Batch calls fan out one
//! request per id at once and report every member separately.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::store::{BatchReport, TodoStore};
use crate::transport::{Transport, UreqTransport};
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo};

#[derive(Clone)]
pub struct TodoApi<T = UreqTransport> {
    client: TodoClient,
    transport: T,
}

impl TodoApi<UreqTransport> {
    /// HTTP API at `base_url` using the stock `ureq` transport.
    pub fn connect(base_url: &str) -> Self {
        Self::new(TodoClient::new(base_url), UreqTransport::new())
    }
}

impl<T: Transport> TodoApi<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub async fn create(&self, title: &str, description: &str) -> Result<Todo, ApiError> {
        let input = CreateTodo {
            title: title.to_string(),
            description: description.to_string(),
        };
        let req = self.client.build_create_todo(&input)?;
        let resp = self.send(&req).await?;
        self.client
            .parse_create_todo(&req, resp)
            .inspect_err(|e| log_failure(&req, e))
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let req = self.client.build_list_todos();
        let resp = self.send(&req).await?;
        self.client
            .parse_list_todos(&req, resp)
            .inspect_err(|e| log_failure(&req, e))
    }

    pub async fn get_one(&self, id: TodoId) -> Result<Todo, ApiError> {
        let req = self.client.build_get_todo(id);
        let resp = self.send(&req).await?;
        self.client
            .parse_get_todo(&req, resp)
            .inspect_err(|e| log_failure(&req, e))
    }

    /// Full replace of title, description and completion.
    pub async fn update(
        &self,
        id: TodoId,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Todo, ApiError> {
        self.patch(id, &UpdateTodo::full(title, description, completed))
            .await
    }

    pub async fn patch(&self, id: TodoId, patch: &UpdateTodo) -> Result<Todo, ApiError> {
        let req = self.client.build_update_todo(id, patch)?;
        self.exchange_todo(req).await
    }

    /// Idempotent on the server: completing a completed todo is a no-op.
    pub async fn complete(&self, id: TodoId) -> Result<Todo, ApiError> {
        let req = self.client.build_complete_todo(id)?;
        self.exchange_todo(req).await
    }

    pub async fn uncomplete(&self, id: TodoId) -> Result<Todo, ApiError> {
        let req = self.client.build_uncomplete_todo(id)?;
        self.exchange_todo(req).await
    }

    /// `NotFound` is returned as-is; callers that only care whether the todo
    /// is gone can treat it as success.
    pub async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let req = self.client.build_delete_todo(id);
        let resp = self.send(&req).await?;
        self.client
            .parse_delete_todo(&req, resp)
            .inspect_err(|e| log_failure(&req, e))
    }

    pub async fn batch_delete(&self, ids: &[TodoId]) -> BatchReport<()> {
        let results = join_all(ids.iter().map(|&id| self.delete(id))).await;
        BatchReport::new(ids.iter().copied().zip(results).collect())
    }

    pub async fn batch_update(&self, ids: &[TodoId], patch: &UpdateTodo) -> BatchReport<Todo> {
        let results = join_all(ids.iter().map(|&id| self.patch(id, patch))).await;
        BatchReport::new(ids.iter().copied().zip(results).collect())
    }

    async fn exchange_todo(&self, req: HttpRequest) -> Result<Todo, ApiError> {
        let resp = self.send(&req).await?;
        self.client
            .parse_update_todo(&req, resp)
            .inspect_err(|e| log_failure(&req, e))
    }

    async fn send(&self, req: &HttpRequest) -> Result<crate::http::HttpResponse, ApiError> {
        debug!(method = %req.method, url = %req.path, "sending request");
        let resp = self
            .transport
            .execute(req.clone())
            .await
            .inspect_err(|e| log_failure(req, e))?;
        debug!(method = %req.method, url = %req.path, status = resp.status, "received response");
        Ok(resp)
    }
}

fn log_failure(req: &HttpRequest, err: &ApiError) {
    warn!(
        method = %req.method,
        url = %req.path,
        status = ?err.status(),
        error = %err,
        "todo API request failed"
    );
}

impl<T: Transport> TodoStore for TodoApi<T> {
    async fn create(&self, input: CreateTodo) -> Result<Todo, ApiError> {
        TodoApi::create(self, &input.title, &input.description).await
    }

    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        TodoApi::list(self).await
    }

    async fn get_one(&self, id: TodoId) -> Result<Todo, ApiError> {
        TodoApi::get_one(self, id).await
    }

    async fn update(&self, id: TodoId, patch: UpdateTodo) -> Result<Todo, ApiError> {
        self.patch(id, &patch).await
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        TodoApi::delete(self, id).await
    }

    async fn batch_update(&self, ids: &[TodoId], patch: UpdateTodo) -> BatchReport<Todo> {
        TodoApi::batch_update(self, ids, &patch).await
    }

    async fn batch_delete(&self, ids: &[TodoId]) -> BatchReport<()> {
        TodoApi::batch_delete(self, ids).await
    }
}
