//! Remote table access.
//!
//! Every entity lives in one table of the hosted database. Controllers talk to
//! it only through the [`RemoteStore`] contract: list, insert, update, delete
//! and count rows of a table, filtered by a [`Filter`].
//!
//! # Architecture
//!
//! - [`Record`] ties an entity type to its table name and key column
//! - [`PostgrestClient`] implements the contract over the `PostgREST` HTTP API
//! - One client is built at startup and cloned into every controller; there
//!   is no implicit global handle and no teardown
//!
//! Every call is a network round trip that may fail; failures are reported as
//! [`RemoteError`] and never retried.

pub mod client;
pub mod filter;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use client::PostgrestClient;
pub use filter::{Condition, Direction, Filter, Op, Ordering};

/// Errors that can occur when talking to the remote table API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed (connection refused, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API key was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Table does not exist or is not exposed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Server rejected the request.
    #[error("Server error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server.
        message: String,
    },

    /// Service could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Response was well-formed HTTP but missing expected data.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// An entity stored as one row of a remote table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Remote table name.
    const TABLE: &'static str;

    /// Primary key column.
    const KEY_COLUMN: &'static str;

    /// Rendered primary key of this row.
    fn key(&self) -> String;

    /// Filter selecting exactly this row.
    fn key_filter(&self) -> Filter {
        Filter::all().eq(Self::KEY_COLUMN, self.key())
    }
}

/// Table operations the forms and services depend on.
///
/// Implementations must be cheap to clone; clones share the same connection.
pub trait RemoteStore: Clone + Send + Sync + 'static {
    /// List rows matching `filter`.
    fn select<E: Record>(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<E>, RemoteError>> + Send;

    /// Insert one row.
    fn insert<E: Record>(&self, record: &E) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Overwrite the rows matching `filter` with the columns of `record`.
    fn update<E: Record>(
        &self,
        record: &E,
        filter: &Filter,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Delete the rows matching `filter`.
    fn delete<E: Record>(&self, filter: &Filter)
    -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Count the rows matching `filter`.
    fn count<E: Record>(&self, filter: &Filter)
    -> impl Future<Output = Result<u64, RemoteError>> + Send;
}
