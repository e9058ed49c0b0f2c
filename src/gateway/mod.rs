pub mod http;
pub mod query;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use http::HttpRecordGateway;
pub use query::{Filter, Query, QueryError, SortDirection};
pub use traits::RecordGateway;
pub use types::{BatchOutcome, Envelope, EnvelopeFailure, RecordResult};
