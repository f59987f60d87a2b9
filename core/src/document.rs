use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type DocId = i64;

/// Caller-assigned tag. The index never interprets it beyond filtering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "actual" => Ok(Self::Actual),
            "irrelevant" => Ok(Self::Irrelevant),
            "banned" => Ok(Self::Banned),
            "removed" => Ok(Self::Removed),
            other => Err(format!("unknown document status: {other}")),
        }
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

/// Pre-filter applied to every candidate before it is scored.
///
/// Implemented for `DocumentStatus` (exact match) and for any
/// `Fn(DocId, DocumentStatus, i32) -> bool`.
pub trait DocumentFilter: Sync {
    fn accept(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool;
}

impl DocumentFilter for DocumentStatus {
    fn accept(&self, _id: DocId, status: DocumentStatus, _rating: i32) -> bool {
        status == *self
    }
}

impl<F> DocumentFilter for F
where
    F: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
{
    fn accept(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool {
        self(id, status, rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_log_format() {
        let doc = Document { id: 3, relevance: 0.5, rating: -2 };
        assert_eq!(doc.to_string(), "{ document_id = 3, relevance = 0.5, rating = -2 }");
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("BANNED".parse::<DocumentStatus>().unwrap(), DocumentStatus::Banned);
        assert!("live".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn filters() {
        assert!(DocumentStatus::Actual.accept(1, DocumentStatus::Actual, 0));
        assert!(!DocumentStatus::Actual.accept(1, DocumentStatus::Banned, 0));
        let even = |id: DocId, _s: DocumentStatus, _r: i32| id % 2 == 0;
        assert!(even.accept(4, DocumentStatus::Removed, 0));
        assert!(!even.accept(5, DocumentStatus::Actual, 0));
    }
}
