//! Request utilities for HTTP endpoints.

use std::sync::Arc;
use std::time::Instant;

use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use tokio::time;

use franchise_db_core::table::QueryOptions;
use franchise_db_core::{Database, DbError, EntityKind, WriteScope};

use crate::router::{AppState, RouterError};

/// Type alias for matchit parameters with explicit lifetimes
pub type MatchitParams<'a, 'b> = matchit::Params<'a, 'b>;

/// Reads the whole request body, failing with `Timeout` after `timeout_ms`.
pub async fn read_request_body_with_timeout<B>(
    req: Request<B>,
    timeout_ms: u64,
) -> Result<Bytes, RouterError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = time::timeout(timeout_duration, req.into_body().collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(body.to_bytes())
}

/// Parses a request body as JSON. An empty body counts as `{}`.
pub fn parse_json_body(bytes: &[u8]) -> Result<Value, RouterError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request: {}", e)))
}

/// Runs a read-only engine call on the blocking pool, bounded by the
/// configured response timeout.
pub async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T, RouterError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    let timeout_duration = time::Duration::from_millis(state.config.response_timeout_ms);
    let task = tokio::task::spawn_blocking(move || op(&db));
    time::timeout(timeout_duration, task)
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Engine task failed: {}", e)))?
        .map_err(map_db_error_to_router_error)
}

/// Runs a mutating engine call on the blocking pool.
///
/// The response timeout becomes the write's deadline inside the engine
/// rather than a timer around the task: the task always runs to completion
/// and reports `Timeout` only when nothing was published.
pub async fn run_write<T, F>(state: &AppState, op: F) -> Result<T, RouterError>
where
    T: Send + 'static,
    F: FnOnce(WriteScope<'_>) -> Result<T, DbError> + Send + 'static,
{
    let db = Arc::clone(&state.db);
    let deadline = Instant::now() + time::Duration::from_millis(state.config.response_timeout_ms);
    tokio::task::spawn_blocking(move || op(db.until(deadline)))
        .await
        .map_err(|e| RouterError::InternalError(format!("Engine task failed: {}", e)))?
        .map_err(map_db_error_to_router_error)
}

/// Map DbError to appropriate RouterError
pub fn map_db_error_to_router_error(e: DbError) -> RouterError {
    let details = Some(e.code().to_string());
    match e {
        DbError::NotFound { .. }
        | DbError::UnknownCollection(_)
        | DbError::UnknownRelation { .. } => RouterError::NotFound {
            message: e.to_string(),
            details,
        },
        DbError::Validation { .. } | DbError::DeleteBlocked { .. } => RouterError::Rejected {
            message: e.to_string(),
            details,
        },
        DbError::Timeout => RouterError::Timeout,
        _ => RouterError::InternalError(e.to_string()),
    }
}

/// Percent-decodes one path segment.
pub fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Resolves the `collection` route parameter.
pub fn parse_collection(params: &MatchitParams<'_, '_>) -> Result<EntityKind, RouterError> {
    let name = decode_segment(params.get("collection").unwrap_or_default());
    EntityKind::from_collection(&name)
        .ok_or_else(|| map_db_error_to_router_error(DbError::UnknownCollection(name)))
}

/// Parses the `id` route parameter.
pub fn parse_id(params: &MatchitParams<'_, '_>) -> Result<u64, RouterError> {
    let raw = params.get("id").unwrap_or_default();
    raw.parse()
        .map_err(|e| RouterError::BadRequest(format!("Invalid record ID '{}': {}", raw, e)))
}

/// Returns the query options when an id segment is `query:...` (or a bare
/// `query` followed by a `?` query string).
pub fn query_segment(id_segment: &str, uri_query: Option<&str>) -> Option<QueryOptions> {
    let decoded = decode_segment(id_segment);
    let lowered = decoded.to_ascii_lowercase();
    if lowered == "query" {
        return Some(QueryOptions::parse(&decode_segment(uri_query.unwrap_or_default())));
    }
    if !lowered.starts_with("query:") {
        return None;
    }
    let mut options = decoded;
    if let Some(extra) = uri_query {
        options.push('&');
        options.push_str(&decode_segment(extra));
    }
    Some(QueryOptions::parse(&options))
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(status: u16, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}
