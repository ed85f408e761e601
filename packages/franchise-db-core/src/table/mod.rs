//! Dense record tables, the type-erased record set seam, and the query
//! pipeline.

mod query;
mod record_set;
#[allow(clippy::module_inception)]
mod table;

pub use query::QueryOptions;
pub use record_set::RecordSet;
pub use table::Table;
