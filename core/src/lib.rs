pub mod batch;
pub mod concurrent;
pub mod corpus;
pub mod dedup;
mod document;
mod error;
mod execution;
mod index;
pub mod paginate;
pub mod query;
pub mod request_queue;
pub mod tokenizer;

pub use document::{DocId, Document, DocumentFilter, DocumentStatus};
pub use error::{Result, SearchError};
pub use execution::ExecutionPolicy;
pub use index::{DocumentIds, SearchIndex};

/// Upper bound on the number of documents `find_top_documents` returns.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
/// Default number of shards in the relevance accumulator.
pub const DEFAULT_BUCKET_COUNT: usize = 100;
/// Relevances closer than this are considered equal and ordered by rating.
pub const RELEVANCE_EPSILON: f64 = 1e-6;
