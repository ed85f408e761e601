//! Record create, read, update and delete handlers.

use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_response, parse_collection, parse_id, parse_json_body,
    read_request_body_with_timeout, run_blocking, run_write, MatchitParams,
};
use super::response::success_json;

/// Creates a record.
///
/// # Endpoint
/// `POST /{collection}`
///
/// # Request Body
/// Scalar fields and foreign-key scalars only, in snake_case or camelCase:
/// ```json
/// {
///   "title": "Cook",
///   "wage": 15.0
/// }
/// ```
///
/// # Response
/// - **201 Created**: Returns the basic projection with the assigned id
/// ```json
/// {
///   "success": true,
///   "data": { "id": 6, "title": "Cook", "wage": 15.0 }
/// }
/// ```
///
/// # Errors
/// - **400 Bad Request**: Body is not JSON, or validation failed
///   (`details` names the reason, e.g. `IdentifierSupplied`)
/// - **404 Not Found**: Unknown collection
/// - **408 Request Timeout**: Not applied within the response timeout
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:8080/positions \
///   -H "Content-Type: application/json" \
///   -d '{"title": "Cook", "wage": 15.0}'
/// ```
pub async fn create_record<B>(
    req: Request<B>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let kind = parse_collection(&params)?;
    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let body = parse_json_body(&body_bytes)?;

    let created = run_write(&state, move |db| db.create_json(kind, body)).await?;
    build_response(201, success_json(created)?)
}

/// Reads the narrative projection of a record.
///
/// # Endpoint
/// `GET /{collection}/{id}`
///
/// # Response
/// - **200 OK**: `{ "id": 2, "summary": "Rui Costa, Cook at ..." }`
///
/// # Errors
/// - **400 Bad Request**: Id is not a number
/// - **404 Not Found**: Unknown collection or record
pub async fn read_record(
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let kind = parse_collection(&params)?;
    let id = parse_id(&params)?;

    let narrative = run_blocking(&state, move |db| db.narrative(kind, id)).await?;
    build_response(200, success_json(narrative)?)
}

/// Reads the raw scalar fields of a record.
///
/// # Endpoint
/// `GET /{collection}/{id}/basic`
///
/// # Errors
/// - **404 Not Found**: Unknown collection or record
pub async fn read_basic(
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let kind = parse_collection(&params)?;
    let id = parse_id(&params)?;

    let basic = run_blocking(&state, move |db| db.basic(kind, id)).await?;
    build_response(200, success_json(basic)?)
}

/// Replaces the scalar fields of a record.
///
/// # Endpoint
/// `PUT /{collection}/{id}`
///
/// # Request Body
/// Every mutable field, as on create. Identifiers and populated relation
/// collections are rejected.
///
/// # Errors
/// - **400 Bad Request**: Validation failed
/// - **404 Not Found**: Unknown collection or record
pub async fn update_record<B>(
    req: Request<B>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let kind = parse_collection(&params)?;
    let id = parse_id(&params)?;
    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let body = parse_json_body(&body_bytes)?;

    let updated = run_write(&state, move |db| db.update_json(kind, id, body)).await?;
    build_response(200, success_json(updated)?)
}

/// Deletes a record according to its table's delete policy.
///
/// # Endpoint
/// `DELETE /{collection}/{id}`
///
/// # Response
/// - **200 OK**: Describes what happened
/// ```json
/// {
///   "success": true,
///   "data": {
///     "outcome": "removed",
///     "table": "MenuItem",
///     "removed": 2,
///     "relocated_from": 5,
///     "rewritten": 0
///   }
/// }
/// ```
/// A referenced position is soft-cleared instead:
/// `{"outcome": "soft_cleared", "table": "Position", "id": 1, "dependents": 2}`.
///
/// # Errors
/// - **400 Bad Request**: Other records still reference the target (`DeleteBlocked`)
/// - **404 Not Found**: Unknown collection or record
pub async fn delete_record(
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let kind = parse_collection(&params)?;
    let id = parse_id(&params)?;

    let outcome = run_write(&state, move |db| db.delete(kind, id)).await?;
    build_response(200, success_json(outcome)?)
}
