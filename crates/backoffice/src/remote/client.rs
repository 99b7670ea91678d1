//! `PostgREST` table API client.
//!
//! Provides typed access to the hosted database's REST interface
//! (`{project}/rest/v1/{table}`): list, insert, update, delete and count rows.

use std::sync::Arc;

use reqwest::header::{CONTENT_RANGE, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{Filter, Record, RemoteError, RemoteStore};
use crate::config::SupabaseConfig;

/// Path of the REST interface below the project URL.
const REST_PATH: &str = "rest/v1/";

/// Seconds to wait when a 429 carries no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// `PostgREST` API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct PostgrestClient {
    inner: Arc<PostgrestClientInner>,
}

struct PostgrestClientInner {
    client: reqwest::Client,
    /// `{project}/rest/v1/`
    rest_url: Url,
    api_key: SecretString,
    schema: String,
}

impl std::fmt::Debug for PostgrestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestClient")
            .field("rest_url", &self.inner.rest_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("schema", &self.inner.schema)
            .finish_non_exhaustive()
    }
}

/// Error body returned by `PostgREST`.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: String,
    #[serde(default)]
    details: Option<String>,
}

impl PostgrestClient {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Http` if the HTTP client cannot be built and
    /// `RemoteError::InvalidUrl` if the REST path cannot be joined.
    pub fn new(config: &SupabaseConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base.join(REST_PATH)?;

        Ok(Self {
            inner: Arc::new(PostgrestClientInner {
                client,
                rest_url,
                api_key: config.api_key.clone(),
                schema: config.schema.clone(),
            }),
        })
    }

    /// Base URL of the REST interface.
    #[must_use]
    pub fn rest_url(&self) -> &Url {
        &self.inner.rest_url
    }

    /// Build the URL for `table` with an optional `select` and the filter.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::InvalidUrl` if `table` is not a valid path segment.
    pub fn table_url(
        &self,
        table: &str,
        select: Option<&str>,
        filter: &Filter,
    ) -> Result<Url, RemoteError> {
        let mut url = self.inner.rest_url.join(table)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(columns) = select {
                query.append_pair("select", columns);
            }
            for (key, value) in filter.query_pairs() {
                query.append_pair(&key, &value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    /// Start a request with authentication and schema headers.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let key = self.inner.api_key.expose_secret();
        let profile_header = if matches!(method, Method::GET | Method::HEAD) {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };

        self.inner
            .client
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key)
            .header(profile_header, &self.inner.schema)
    }

    /// Map non-success statuses to `RemoteError`.
    async fn check(table: &str, response: Response) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                Err(RemoteError::RateLimited(retry_after))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let message = error_message(status, &response.text().await.unwrap_or_default());
                Err(RemoteError::Unauthorized(message))
            }
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(table.to_string())),
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                let message = error_message(status, &response.text().await.unwrap_or_default());
                Err(RemoteError::Unavailable(message))
            }
            _ => {
                let message = error_message(status, &response.text().await.unwrap_or_default());
                warn!(table, status = status.as_u16(), %message, "Table API rejected request");
                Err(RemoteError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

impl RemoteStore for PostgrestClient {
    #[instrument(skip(self, filter), fields(table = E::TABLE))]
    async fn select<E: Record>(&self, filter: &Filter) -> Result<Vec<E>, RemoteError> {
        let url = self.table_url(E::TABLE, Some("*"), filter)?;
        let response = self.request(Method::GET, url).send().await?;
        let response = Self::check(E::TABLE, response).await?;

        let body = response.bytes().await?;
        let rows: Vec<E> = serde_json::from_slice(&body)?;

        debug!(rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self, record), fields(table = E::TABLE, key = %record.key()))]
    async fn insert<E: Record>(&self, record: &E) -> Result<(), RemoteError> {
        let url = self.table_url(E::TABLE, None, &Filter::all())?;
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(std::slice::from_ref(record))
            .send()
            .await?;
        Self::check(E::TABLE, response).await?;

        debug!("Inserted row");
        Ok(())
    }

    #[instrument(skip(self, record, filter), fields(table = E::TABLE, key = %record.key()))]
    async fn update<E: Record>(&self, record: &E, filter: &Filter) -> Result<(), RemoteError> {
        let url = self.table_url(E::TABLE, None, filter)?;
        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;
        Self::check(E::TABLE, response).await?;

        debug!("Updated row");
        Ok(())
    }

    #[instrument(skip(self, filter), fields(table = E::TABLE))]
    async fn delete<E: Record>(&self, filter: &Filter) -> Result<(), RemoteError> {
        let url = self.table_url(E::TABLE, None, filter)?;
        let response = self.request(Method::DELETE, url).send().await?;
        Self::check(E::TABLE, response).await?;

        debug!("Deleted rows");
        Ok(())
    }

    #[instrument(skip(self, filter), fields(table = E::TABLE))]
    async fn count<E: Record>(&self, filter: &Filter) -> Result<u64, RemoteError> {
        let url = self.table_url(E::TABLE, Some(E::KEY_COLUMN), filter)?;
        let response = self
            .request(Method::HEAD, url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = Self::check(E::TABLE, response).await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(parse_content_range)
            .ok_or_else(|| {
                RemoteError::InvalidResponse(format!(
                    "missing or malformed Content-Range for {}",
                    E::TABLE
                ))
            })?;

        debug!(total, "Counted rows");
        Ok(total)
    }
}

/// Extract the total from a `Content-Range` header (`0-24/3573`, `*/0`).
#[must_use]
pub fn parse_content_range(value: &HeaderValue) -> Option<u64> {
    let text = value.to_str().ok()?;
    let (_, total) = text.trim().rsplit_once('/')?;
    total.parse().ok()
}

/// Prefer the `PostgREST` message, then the raw body, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<PostgrestErrorBody>(body) {
        return match parsed.details {
            Some(details) if !details.is_empty() => format!("{} ({details})", parsed.message),
            _ => parsed.message,
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(url: &str) -> PostgrestClient {
        let config = SupabaseConfig::new(url, SecretString::from("k3y-aB9xQ2mZ7")).unwrap();
        PostgrestClient::new(&config).unwrap()
    }

    #[test]
    fn test_rest_url_from_bare_host() {
        let client = client("https://abc.supabase.co");
        assert_eq!(client.rest_url().as_str(), "https://abc.supabase.co/rest/v1/");
    }

    #[test]
    fn test_rest_url_keeps_path_prefix() {
        let client = client("http://localhost:8000/proxy");
        assert_eq!(client.rest_url().as_str(), "http://localhost:8000/proxy/rest/v1/");
    }

    #[test]
    fn test_table_url_with_select_and_filter() {
        let client = client("https://abc.supabase.co");
        let filter = Filter::all().eq("customer_id", "42");
        let url = client.table_url("sales", Some("*"), &filter).unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/sales?select=*&customer_id=eq.42"
        );
    }

    #[test]
    fn test_table_url_without_query() {
        let client = client("https://abc.supabase.co");
        let url = client.table_url("brands", None, &Filter::all()).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/brands");
    }

    #[test]
    fn test_table_url_encodes_timestamps() {
        let client = client("https://abc.supabase.co");
        let filter = Filter::all().gte("sale_date", "2026-10-09T00:00:00+00:00");
        let url = client.table_url("sales", None, &filter).unwrap();
        assert!(url.as_str().ends_with("sale_date=gte.2026-10-09T00%3A00%3A00%2B00%3A00"));
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range(&HeaderValue::from_static("0-24/3573")), Some(3573));
        assert_eq!(parse_content_range(&HeaderValue::from_static("*/0")), Some(0));
        assert_eq!(parse_content_range(&HeaderValue::from_static("0-9/*")), None);
        assert_eq!(parse_content_range(&HeaderValue::from_static("garbage")), None);
    }

    #[test]
    fn test_error_message_prefers_postgrest_body() {
        let body = r#"{"code":"23505","details":"Key exists.","hint":null,"message":"duplicate key"}"#;
        assert_eq!(
            error_message(StatusCode::CONFLICT, body),
            "duplicate key (Key exists.)"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::BAD_REQUEST, ""), "Bad Request");
        assert_eq!(error_message(StatusCode::BAD_REQUEST, " oops "), "oops");
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = client("https://abc.supabase.co");
        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("k3y-aB9xQ2mZ7"));
    }
}
