//! REST API server for the franchise record store.
//!
//! Provides HTTP endpoints for collection listings, record CRUD, the
//! filter/sort/page query syntax and nested resources, plus request routing.

pub mod handlers;
pub mod router;
pub mod server;
