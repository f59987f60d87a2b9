//! Running many queries against one index at once.

use rayon::prelude::*;

use crate::{Document, Result, SearchIndex};

/// Runs `find_top_documents` for every query in parallel.
///
/// Results are returned in query order. If any query fails, one of the
/// failures is returned.
pub fn process_queries<Q>(index: &SearchIndex, queries: &[Q]) -> Result<Vec<Vec<Document>>>
where
    Q: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|query| index.find_top_documents(query.as_ref()))
        .collect()
}

/// Like [`process_queries`], flattened into one sequence.
pub fn process_queries_joined<Q>(index: &SearchIndex, queries: &[Q]) -> Result<Vec<Document>>
where
    Q: AsRef<str> + Sync,
{
    Ok(process_queries(index, queries)?.into_iter().flatten().collect())
}
