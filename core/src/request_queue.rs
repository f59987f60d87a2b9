use std::collections::VecDeque;

use crate::{Document, DocumentFilter, DocumentStatus, ExecutionPolicy, Result, SearchIndex};

/// Number of most recent requests the queue remembers.
pub const MIN_IN_DAY: usize = 1440;

/// Records, over a sliding window of requests, which searches came back empty.
pub struct RequestQueue<'a> {
    index: &'a SearchIndex,
    window: usize,
    // true for requests that returned nothing
    requests: VecDeque<bool>,
}

impl<'a> RequestQueue<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self::with_window(index, MIN_IN_DAY)
    }

    pub fn with_window(index: &'a SearchIndex, window: usize) -> Self {
        Self {
            index,
            window: window.max(1),
            requests: VecDeque::new(),
        }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_with(raw_query, DocumentStatus::Actual)
    }

    /// Failed queries are returned to the caller and not recorded.
    pub fn add_find_request_with<F: DocumentFilter>(
        &mut self,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>> {
        let result = self
            .index
            .find_top_documents_with(ExecutionPolicy::Sequential, raw_query, filter)?;
        self.requests.push_back(result.is_empty());
        if self.requests.len() > self.window {
            self.requests.pop_front();
        }
        Ok(result)
    }

    pub fn no_result_requests(&self) -> usize {
        self.requests.iter().filter(|&&empty| empty).count()
    }
}
