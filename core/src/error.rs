//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the todo
//! does not exist" from "the server returned an unexpected status" (delete
//! treats it as success). All other non-2xx responses land in `Request`
//! with enough of the exchange to diagnose it from a log line.

use thiserror::Error;

use crate::http::HttpMethod;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("{method} {url} failed with HTTP {status}: {body}")]
    Request {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: HttpMethod,
        url: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    /// HTTP status of the failed exchange, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
