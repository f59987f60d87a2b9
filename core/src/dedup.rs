use std::collections::HashSet;
use tracing::info;

use crate::{DocId, SearchIndex};

/// Removes documents whose set of terms equals that of a lower id.
///
/// Term frequencies are ignored; only the key sets are compared. Returns the
/// removed ids in ascending order.
pub fn remove_duplicates(index: &mut SearchIndex) -> Vec<DocId> {
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    let duplicates: Vec<DocId> = index
        .iter()
        .filter(|&id| {
            let words = index.word_frequencies(id).keys().map(String::as_str).collect();
            !seen.insert(words)
        })
        .collect();

    for &id in &duplicates {
        info!(id, "found duplicate document id");
        index.remove_document(id);
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentStatus;

    #[test]
    fn keeps_lowest_id_per_term_set() {
        let mut index = SearchIndex::new("and with").unwrap();
        let docs = [
            (1, "funny pet and nasty rat"),
            (2, "funny pet with curly hair"),
            (3, "funny pet with curly hair"),
            (4, "funny pet and curly hair"),
            (5, "funny funny pet and nasty nasty rat"),
            (6, "funny pet and not very nasty rat"),
            (7, "very nasty rat and not very funny pet"),
            (8, "pet with rat and rat and rat"),
            (9, "nasty rat with curly hair"),
        ];
        for (id, text) in docs {
            index.add_document(id, text, DocumentStatus::Actual, &[1]).unwrap();
        }

        let removed = remove_duplicates(&mut index);
        assert_eq!(removed, vec![3, 4, 5, 7]);
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![1, 2, 6, 8, 9]);
        assert!(remove_duplicates(&mut index).is_empty());
    }
}
