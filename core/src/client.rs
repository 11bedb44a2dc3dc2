//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes the `HttpResponse`
//! together with the request it answers, so failures can name the exchange.
//! `TodoApi` glues the two halves to a `Transport`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo};

/// Address of the todo service when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

const COLLECTION: &str = "/api/todos";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl Default for TodoClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{COLLECTION}", self.base_url)
    }

    fn item_url(&self, id: TodoId) -> String {
        format!("{}{COLLECTION}/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, self.collection_url(), input)
    }

    pub fn build_update_todo(&self, id: TodoId, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, self.item_url(id), input)
    }

    pub fn build_complete_todo(&self, id: TodoId) -> Result<HttpRequest, ApiError> {
        self.build_update_todo(id, &UpdateTodo::completed(true))
    }

    pub fn build_uncomplete_todo(&self, id: TodoId) -> Result<HttpRequest, ApiError> {
        self.build_update_todo(id, &UpdateTodo::completed(false))
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, request: &HttpRequest, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(request, response)
    }

    pub fn parse_get_todo(&self, request: &HttpRequest, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(request, response)
    }

    pub fn parse_create_todo(&self, request: &HttpRequest, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(request, response)
    }

    pub fn parse_update_todo(&self, request: &HttpRequest, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(request, response)
    }

    pub fn parse_delete_todo(&self, request: &HttpRequest, response: HttpResponse) -> Result<(), ApiError> {
        check_status(request, &response)
    }
}

fn json_request<T: Serialize>(method: HttpMethod, path: String, input: &T) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn parse_json<T: DeserializeOwned>(request: &HttpRequest, response: HttpResponse) -> Result<T, ApiError> {
    check_status(request, &response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(request: &HttpRequest, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Request {
        method: request.method,
        url: request.path.clone(),
        status: response.status,
        body: response.body.clone(),
    })
}
