use std::collections::BTreeSet;

use crate::error::{Result, SearchError};
use crate::tokenizer::{is_malformed_minus, tokenize};

/// A parsed query. Both lists are sorted, deduplicated and free of stop-words.
///
/// The lists are not required to be disjoint: `cat -cat` yields `cat` in
/// both, and ranking lets the exclusion win.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    pub must_include: Vec<String>,
    pub must_exclude: Vec<String>,
}

impl Query {
    pub fn parse(text: &str, stop_words: &BTreeSet<String>) -> Result<Self> {
        let mut query = Query::default();
        for word in tokenize(text)? {
            if is_malformed_minus(word) {
                return Err(SearchError::InvalidQuery(word.to_string()));
            }
            let (word, is_minus) = match word.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (word, false),
            };
            if stop_words.contains(word) {
                continue;
            }
            if is_minus {
                query.must_exclude.push(word.to_string());
            } else {
                query.must_include.push(word.to_string());
            }
        }
        for words in [&mut query.must_include, &mut query.must_exclude] {
            words.sort_unstable();
            words.dedup();
        }
        Ok(query)
    }
}
