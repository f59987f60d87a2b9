use thiserror::Error;

use crate::DocId;

/// Validation failures surfaced by the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("document id {0} is negative")]
    InvalidId(DocId),

    #[error("document id {0} already exists")]
    DuplicateId(DocId),

    #[error("text contains control characters: {0:?}")]
    InvalidText(String),

    #[error("malformed minus word in query: {0:?}")]
    InvalidQuery(String),

    #[error("document id {0} does not exist")]
    UnknownId(DocId),
}

pub type Result<T> = std::result::Result<T, SearchError>;
