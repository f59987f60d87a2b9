use search_core::{DocId, Document, DocumentStatus, ExecutionPolicy, SearchError, SearchIndex};

fn sample() -> SearchIndex {
    let mut index = SearchIndex::new("a the jj").unwrap();
    index.add_document(65, "ioy jiijiji fr a jigj", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
    index.add_document(85, "jigj a jj opr", DocumentStatus::Actual, &[5, 6, 7]).unwrap();
    index
}

fn ids(docs: &[Document]) -> Vec<DocId> {
    docs.iter().map(|d| d.id).collect()
}

/// Small deterministic corpus over a narrow vocabulary so queries hit many documents.
fn generated(bucket_count: usize) -> SearchIndex {
    let vocab: Vec<String> = (0..40).map(|i| format!("w{i}")).collect();
    let mut index = SearchIndex::new("w0 w1").unwrap().with_bucket_count(bucket_count);
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    for id in 0..500 {
        let len = 3 + (next() % 12) as usize;
        let text: Vec<&str> = (0..len).map(|_| vocab[(next() % 40) as usize].as_str()).collect();
        let status = if next() % 5 == 0 { DocumentStatus::Banned } else { DocumentStatus::Actual };
        let ratings = [(next() % 11) as i32 - 5, (next() % 11) as i32 - 5];
        index.add_document(id, &text.join(" "), status, &ratings).unwrap();
    }
    index
}

#[test]
fn spec_ranking_example() {
    let index = sample();
    assert_eq!(ids(&index.find_top_documents("ioy jigj").unwrap()), vec![65, 85]);
    assert_eq!(ids(&index.find_top_documents("jigj -ioy").unwrap()), vec![85]);
    let (words, status) = index.match_document("ioy tpp -fr", 65).unwrap();
    assert!(words.is_empty());
    assert_eq!(status, DocumentStatus::Actual);
}

#[test]
fn control_chars_rejected_anywhere() {
    let mut index = sample();
    for bad in ["\u{1}ioy", "ioy\u{1f}", "io\u{a}y jigj"] {
        assert!(matches!(index.find_top_documents(bad), Err(SearchError::InvalidText(_))));
        assert!(matches!(index.match_document(bad, 65), Err(SearchError::InvalidText(_))));
        assert!(matches!(
            index.add_document(1, bad, DocumentStatus::Actual, &[]),
            Err(SearchError::InvalidText(_))
        ));
    }
    assert_eq!(index.document_count(), 2);
}

#[test]
fn removal_then_readd() {
    let mut index = sample();
    index.remove_document(65);
    index.remove_document(65);
    assert_eq!(index.document_count(), 1);
    index.add_document(65, "ioy", DocumentStatus::Actual, &[]).unwrap();
    assert_eq!(ids(&index.find_top_documents("ioy").unwrap()), vec![65]);
}

#[test]
fn parallel_ranking_matches_sequential() {
    let queries = [
        "w2 w3 w4",
        "w5 -w6 w7 w8",
        "w9 w10 w11 w12 w13 -w14 -w15",
        "w0 w1 w16",
        "w17 -w17",
        "nothing here",
    ];
    let reference = generated(1);
    for bucket_count in [1, 3, 100, 1024] {
        let index = generated(bucket_count);
        for query in queries {
            let actual = |_id: DocId, status: DocumentStatus, _rating: i32| status == DocumentStatus::Actual;
            let sparse = |id: DocId, _status: DocumentStatus, rating: i32| id % 3 != 0 && rating >= 0;
            let filters: [&(dyn Fn(DocId, DocumentStatus, i32) -> bool + Sync); 2] = [&actual, &sparse];
            for filter in filters {
                let seq = reference
                    .find_top_documents_with(ExecutionPolicy::Sequential, query, filter)
                    .unwrap();
                let par = index
                    .find_top_documents_with(ExecutionPolicy::Parallel, query, filter)
                    .unwrap();
                assert_eq!(seq.len(), par.len(), "{query} / {bucket_count}");
                for (s, p) in seq.iter().zip(&par) {
                    assert!((s.relevance - p.relevance).abs() < 1e-6, "{query}: {s} vs {p}");
                    assert_eq!(s.rating, p.rating);
                }
            }
        }
    }
}

#[test]
fn parallel_removal_matches_sequential() {
    let mut seq = generated(100);
    let mut par = generated(100);
    for id in (0..500).step_by(3) {
        seq.remove_document_with(ExecutionPolicy::Sequential, id);
        par.remove_document_with(ExecutionPolicy::Parallel, id);
    }
    assert_eq!(seq.iter().collect::<Vec<_>>(), par.iter().collect::<Vec<_>>());
    for id in &seq {
        assert_eq!(seq.word_frequencies(id), par.word_frequencies(id));
    }
    for query in ["w2 w3", "w4 -w5", "w6 w7 w8 w9"] {
        assert_eq!(seq.find_top_documents(query).unwrap(), par.find_top_documents(query).unwrap());
        for id in [1, 2, 4] {
            assert_eq!(
                seq.match_document(query, id).unwrap(),
                par.match_document_with(ExecutionPolicy::Parallel, query, id).unwrap()
            );
        }
    }
}

#[test]
fn concurrent_readers_share_index() {
    let index = generated(64);
    let expected = index.find_top_documents("w2 w3 -w4").unwrap();
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..20 {
                    let found = index
                        .find_top_documents_with(ExecutionPolicy::Parallel, "w2 w3 -w4", DocumentStatus::Actual)
                        .unwrap();
                    assert_eq!(ids(&found).len(), ids(&expected).len());
                    index.match_document_with(ExecutionPolicy::Parallel, "w2 w3", 7).unwrap();
                }
            });
        }
    });
}
