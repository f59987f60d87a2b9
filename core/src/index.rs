use parking_lot::RwLock;
use std::collections::{btree_map, BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::concurrent::ConcurrentMap;
use crate::error::{Result, SearchError};
use crate::query::Query;
use crate::tokenizer::{has_control_chars, tokenize};
use crate::{
    DocId, Document, DocumentFilter, DocumentStatus, ExecutionPolicy, DEFAULT_BUCKET_COUNT,
    MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON,
};

static EMPTY_FREQS: BTreeMap<String, f64> = BTreeMap::new();

struct DocumentData {
    rating: i32,
    status: DocumentStatus,
    word_freqs: BTreeMap<String, f64>,
}

type Postings = RwLock<BTreeMap<DocId, f64>>;

/// In-memory TF-IDF index.
///
/// Mutations take `&mut self`, so the document store and the inverted index
/// are never observed out of step. Shared-reference operations (ranking,
/// matching, lookups) may run concurrently with each other. Callers sharing an
/// index across threads serialize mutations with an outer lock.
pub struct SearchIndex {
    stop_words: BTreeSet<String>,
    word_to_document_freqs: HashMap<String, Postings>,
    documents: BTreeMap<DocId, DocumentData>,
    bucket_count: usize,
}

impl SearchIndex {
    /// Builds an index whose stop-words are the space-separated words of `stop_words_text`.
    pub fn new(stop_words_text: &str) -> Result<Self> {
        Self::from_stop_words(tokenize(stop_words_text)?)
    }

    pub fn from_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = BTreeSet::new();
        for word in stop_words {
            let word = word.as_ref();
            if has_control_chars(word) {
                return Err(SearchError::InvalidText(word.to_string()));
            }
            if !word.is_empty() {
                words.insert(word.to_string());
            }
        }
        Ok(Self {
            stop_words: words,
            word_to_document_freqs: HashMap::new(),
            documents: BTreeMap::new(),
            bucket_count: DEFAULT_BUCKET_COUNT,
        })
    }

    /// Sets the shard count of the relevance accumulator used by parallel ranking.
    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count.max(1);
        self
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn stop_words(&self) -> &BTreeSet<String> {
        &self.stop_words
    }

    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if id < 0 {
            return Err(SearchError::InvalidId(id));
        }
        if self.documents.contains_key(&id) {
            return Err(SearchError::DuplicateId(id));
        }
        let words = self.split_into_words_no_stop(text)?;

        let mut word_freqs: BTreeMap<String, f64> = BTreeMap::new();
        let inv_word_count = 1.0 / words.len() as f64;
        for word in &words {
            *word_freqs.entry((*word).to_string()).or_insert(0.0) += inv_word_count;
        }
        for (word, freq) in &word_freqs {
            self.word_to_document_freqs
                .entry(word.clone())
                .or_default()
                .get_mut()
                .insert(id, *freq);
        }

        let rating = compute_average_rating(ratings);
        debug!(id, terms = word_freqs.len(), rating, ?status, "document added");
        self.documents.insert(id, DocumentData { rating, status, word_freqs });
        Ok(())
    }

    pub fn remove_document(&mut self, id: DocId) {
        self.remove_document_with(ExecutionPolicy::Sequential, id);
    }

    /// Removes a document; absent ids are ignored.
    ///
    /// The document's term list is detached from the store first, then each
    /// term's posting is erased under `policy`. Terms left with no postings are
    /// dropped from the index afterwards.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, id: DocId) {
        let Some(data) = self.documents.remove(&id) else {
            debug!(id, "remove of unknown document ignored");
            return;
        };
        let words: Vec<&String> = data.word_freqs.keys().collect();

        let index = &self.word_to_document_freqs;
        policy.for_each(&words, |word| {
            if let Some(postings) = index.get(*word) {
                postings.write().remove(&id);
            }
        });

        for word in words {
            let emptied = self
                .word_to_document_freqs
                .get_mut(word.as_str())
                .is_some_and(|postings| postings.get_mut().is_empty());
            if emptied {
                self.word_to_document_freqs.remove(word.as_str());
            }
        }
        debug!(id, ?policy, terms = data.word_freqs.len(), "document removed");
    }

    /// Top documents with status `Actual`, ranked sequentially.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, DocumentStatus::Actual)
    }

    /// Ranks documents accepted by `filter` against `raw_query`.
    ///
    /// Results are ordered by descending relevance; relevances within
    /// `RELEVANCE_EPSILON` are ordered by descending rating. At most
    /// `MAX_RESULT_DOCUMENT_COUNT` documents are returned.
    pub fn find_top_documents_with<F: DocumentFilter>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>> {
        let mut matched = self.rank_documents_with(policy, raw_query, filter)?;
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        Ok(matched)
    }

    /// Every document accepted by `filter` that matches `raw_query`, in rank
    /// order and without the result cap.
    pub fn rank_documents_with<F: DocumentFilter>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: F,
    ) -> Result<Vec<Document>> {
        let query = self.parse_query(raw_query)?;
        let mut matched = self.find_all_documents(policy, &query, &filter);
        sort_by_rank(&mut matched);
        debug!(
            ?policy,
            include = query.must_include.len(),
            exclude = query.must_exclude.len(),
            total = matched.len(),
            "ranked query"
        );
        Ok(matched)
    }

    fn find_all_documents<F: DocumentFilter>(
        &self,
        policy: ExecutionPolicy,
        query: &Query,
        filter: &F,
    ) -> Vec<Document> {
        let relevance: ConcurrentMap<DocId, f64> =
            ConcurrentMap::new(policy.bucket_count(self.bucket_count));

        policy.for_each(&query.must_include, |word| {
            let Some(postings) = self.word_to_document_freqs.get(word) else {
                return;
            };
            let postings = postings.read();
            let idf = self.inverse_document_freq(postings.len());
            for (&id, &term_freq) in postings.iter() {
                let Some(data) = self.documents.get(&id) else {
                    continue;
                };
                if filter.accept(id, data.status, data.rating) {
                    *relevance.access(id) += term_freq * idf;
                }
            }
        });

        // Runs after every inclusion has landed, so exclusion always wins.
        policy.for_each(&query.must_exclude, |word| {
            if let Some(postings) = self.word_to_document_freqs.get(word) {
                for id in postings.read().keys() {
                    relevance.erase(*id);
                }
            }
        });

        relevance
            .into_ordinary_map()
            .into_iter()
            .filter_map(|(id, relevance)| {
                let data = self.documents.get(&id)?;
                Some(Document { id, relevance, rating: data.rating })
            })
            .collect()
    }

    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<(Vec<String>, DocumentStatus)> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, id)
    }

    /// Returns the query's include-terms present in document `id`, sorted.
    ///
    /// The list is empty when any exclude-term hits the document.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<String>, DocumentStatus)> {
        let status = self
            .documents
            .get(&id)
            .map(|data| data.status)
            .ok_or(SearchError::UnknownId(id))?;
        let query = self.parse_query(raw_query)?;

        let contains = |word: &String| {
            self.word_to_document_freqs
                .get(word)
                .is_some_and(|postings| postings.read().contains_key(&id))
        };
        if policy.any(&query.must_exclude, &contains) {
            return Ok((Vec::new(), status));
        }
        Ok((policy.filter_cloned(&query.must_include, &contains), status))
    }

    /// The stored term frequencies of `id`, or an empty map if it is not live.
    pub fn word_frequencies(&self, id: DocId) -> &BTreeMap<String, f64> {
        self.documents
            .get(&id)
            .map_or(&EMPTY_FREQS, |data| &data.word_freqs)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.documents.contains_key(&id)
    }

    /// Live document ids, ascending.
    pub fn iter(&self) -> DocumentIds<'_> {
        DocumentIds(self.documents.keys())
    }

    pub fn parse_query(&self, raw_query: &str) -> Result<Query> {
        Query::parse(raw_query, &self.stop_words)
    }

    fn split_into_words_no_stop<'a>(&self, text: &'a str) -> Result<Vec<&'a str>> {
        Ok(tokenize(text)?
            .into_iter()
            .filter(|word| !self.stop_words.contains(*word))
            .collect())
    }

    fn inverse_document_freq(&self, docs_with_word: usize) -> f64 {
        (self.document_count() as f64 / docs_with_word as f64).ln()
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = DocId;
    type IntoIter = DocumentIds<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over live document ids.
pub struct DocumentIds<'a>(btree_map::Keys<'a, DocId, DocumentData>);

impl Iterator for DocumentIds<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        self.0.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for DocumentIds<'_> {}

/// Integer mean, truncated toward zero; zero for no ratings.
fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}

/// Orders by descending relevance. Runs of documents within `RELEVANCE_EPSILON`
/// of the run's most relevant member are then ordered by descending rating.
/// Both sorts are stable, so remaining ties keep ascending id order.
fn sort_by_rank(docs: &mut [Document]) {
    docs.sort_by(|lhs, rhs| rhs.relevance.total_cmp(&lhs.relevance));
    let mut start = 0;
    while start < docs.len() {
        let head = docs[start].relevance;
        let len = docs[start..]
            .iter()
            .take_while(|doc| head - doc.relevance < RELEVANCE_EPSILON)
            .count();
        docs[start..start + len].sort_by(|lhs, rhs| rhs.rating.cmp(&lhs.rating));
        start += len;
    }
}
