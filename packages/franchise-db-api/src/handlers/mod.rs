//! HTTP endpoint implementations for records, listings, queries and nested
//! resources.

pub mod query_handlers;
pub mod record_handlers;
pub mod request_utils;
pub mod response;

pub use query_handlers::{list_collections, list_records, nested_records, query_records};
pub use record_handlers::{create_record, delete_record, read_basic, read_record, update_record};
pub use response::{error_response, success_response, ApiError, ApiResponse, ErrorResponse};
