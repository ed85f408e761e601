//! Matchit routing configuration.

use std::sync::Arc;

use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use matchit::Router as MatchitRouter;

use crate::handlers;
use crate::handlers::request_utils::query_segment;
use franchise_db_core::{config::DbConfig, database::Database};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database instance
    pub db: Arc<Database>,
    /// Database configuration
    pub config: Arc<DbConfig>,
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a router serving `db` with the database's configuration.
    pub fn new(db: Arc<Database>) -> Result<Self, RouterError> {
        let mut router = MatchitRouter::new();
        for (path, handler) in [
            ("/collections", RouteHandler::Collections),
            ("/{collection}", RouteHandler::Collection),
            ("/{collection}/{id}", RouteHandler::Record),
            ("/{collection}/{id}/{relation}", RouteHandler::Nested),
        ] {
            router.insert(path, handler).map_err(|e| {
                RouterError::InternalError(format!("Failed to insert {} route: {}", path, e))
            })?;
        }

        let config = Arc::clone(db.config());
        Ok(Self {
            inner: router,
            state: AppState { db, config },
        })
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Arguments
    /// * `req` - HTTP request
    ///
    /// # Returns
    /// The handler's response, or the error it failed with. Unmatched paths
    /// fail with `RouterError::NotFound`.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let path = req.uri().path().to_string();
        tracing::debug!("{} {}", req.method(), path);

        match self.inner.at(&path) {
            Ok(matched) => {
                matched
                    .value
                    .handle(req, matched.params, self.state.clone())
                    .await
            }
            Err(_) => Err(RouterError::NotFound {
                message: format!("No route found for {}", path),
                details: None,
            }),
        }
    }

    /// Routes a request and converts any error into its JSON error response.
    pub async fn respond<B>(&self, req: Request<B>) -> Response<Bytes>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        match self.route(req).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    RouterError::InternalError(_) | RouterError::Timeout => {
                        tracing::error!("{} {} failed: {}", method, path, err)
                    }
                    _ => tracing::warn!("{} {} rejected: {}", method, path, err),
                }
                err.into()
            }
        }
    }
}

/// Route handler function.
enum RouteHandler {
    Collections,
    Collection,
    Record,
    Nested,
}

impl RouteHandler {
    /// Handles a request with the given route parameters.
    async fn handle<B>(
        &self,
        req: Request<B>,
        params: matchit::Params<'_, '_>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let method = req.method().clone();
        match self {
            RouteHandler::Collections => match method {
                Method::GET => handlers::list_collections(state).await,
                _ => Err(RouterError::MethodNotAllowed),
            },
            RouteHandler::Collection => match method {
                Method::GET => handlers::list_records(params, state).await,
                Method::POST => handlers::create_record(req, params, state).await,
                _ => Err(RouterError::MethodNotAllowed),
            },
            RouteHandler::Record => {
                let id = params.get("id").unwrap_or_default();
                if let Some(options) = query_segment(id, req.uri().query()) {
                    return match method {
                        Method::GET => handlers::query_records(params, options, state).await,
                        _ => Err(RouterError::MethodNotAllowed),
                    };
                }
                match method {
                    Method::GET => handlers::read_record(params, state).await,
                    Method::PUT => handlers::update_record(req, params, state).await,
                    Method::DELETE => handlers::delete_record(params, state).await,
                    _ => Err(RouterError::MethodNotAllowed),
                }
            }
            RouteHandler::Nested => {
                let basic = params
                    .get("relation")
                    .is_some_and(|relation| relation.eq_ignore_ascii_case("basic"));
                match method {
                    Method::GET if basic => handlers::read_basic(params, state).await,
                    Method::GET => handlers::nested_records(params, state).await,
                    _ => Err(RouterError::MethodNotAllowed),
                }
            }
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    /// Unknown route, collection, relation or record
    NotFound {
        message: String,
        details: Option<String>,
    },
    /// Request refused by validation or a delete policy
    Rejected {
        message: String,
        details: Option<String>,
    },
}

impl RouterError {
    fn status(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed => 405,
            RouterError::InternalError(_) => 500,
            RouterError::Timeout => 408,
            RouterError::BadRequest(_) | RouterError::Rejected { .. } => 400,
            RouterError::NotFound { .. } => 404,
        }
    }
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
            RouterError::Rejected { message, .. } => write!(f, "Rejected: {}", message),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let (message, details) = match err {
            RouterError::MethodNotAllowed => ("Method Not Allowed".to_string(), None),
            RouterError::Timeout => ("Request Timeout".to_string(), None),
            RouterError::InternalError(msg) | RouterError::BadRequest(msg) => (msg, None),
            RouterError::NotFound { message, details }
            | RouterError::Rejected { message, details } => (message, details),
        };

        let error_response = handlers::error_response(status, message, details);
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\",\"details\":null}}}}", e).into_bytes());

        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() =
            hyper::StatusCode::from_u16(status).unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);
        response.headers_mut().insert(
            hyper::header::CONTENT_TYPE,
            hyper::header::HeaderValue::from_static("application/json"),
        );
        response
    }
}
