//! Listing, query and nested-resource handlers.

use hyper::{body::Bytes, Response};

use franchise_db_core::table::QueryOptions;
use franchise_db_core::EntityKind;

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_response, decode_segment, parse_collection, parse_id, run_blocking, MatchitParams,
};
use super::response::success_json;

/// Lists the collection names.
///
/// # Endpoint
/// `GET /collections`
///
/// # Response
/// ```json
/// { "success": true, "data": ["positions", "locations", "employees", ...] }
/// ```
pub async fn list_collections(_state: AppState) -> Result<Response<Bytes>, RouterError> {
    let names: Vec<&str> = EntityKind::ALL
        .into_iter()
        .map(EntityKind::collection)
        .collect();
    build_response(200, success_json(names)?)
}

/// Lists narrative projections of every record in identifier order.
///
/// # Endpoint
/// `GET /{collection}`
pub async fn list_records(
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let kind = parse_collection(&params)?;
    let rows = run_blocking(&state, move |db| Ok(db.list(kind))).await?;
    build_response(200, success_json(rows)?)
}

/// Runs the filter, sort and page pipeline.
///
/// # Endpoint
/// `GET /{collection}/query:opt=val&opt=val...`
///
/// # Options
/// Option names are case-insensitive; unknown options and unparsable values
/// are ignored.
/// - `filter`: Case-insensitive substring of the display field
/// - `sortby`: Field to sort by ascending
/// - `desc=true`: Reverse the selected order
/// - `pgsz` / `pgind`: Page size and one-based page index
///
/// # Example
/// ```bash
/// # Two best-paid positions
/// curl "http://localhost:8080/positions/query:desc=true&sortby=wage&pgsz=2&pgind=1"
/// ```
pub async fn query_records(
    params: MatchitParams<'_, '_>,
    options: QueryOptions,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let kind = parse_collection(&params)?;
    let rows = run_blocking(&state, move |db| Ok(db.query(kind, &options))).await?;
    build_response(200, success_json(rows)?)
}

/// Lists records related to one parent record.
///
/// # Endpoint
/// `GET /{collection}/{id}/{relation}`, e.g. `/menus/1/dishes`
///
/// # Errors
/// - **404 Not Found**: Unknown collection, relation or parent record
pub async fn nested_records(
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let kind = parse_collection(&params)?;
    let id = parse_id(&params)?;
    let relation = decode_segment(params.get("relation").unwrap_or_default());

    let rows = run_blocking(&state, move |db| db.nested(kind, id, &relation)).await?;
    build_response(200, success_json(rows)?)
}
