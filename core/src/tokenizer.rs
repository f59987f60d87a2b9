use crate::error::{Result, SearchError};

/// True if any character has a code in `0..=31`.
pub fn has_control_chars(text: &str) -> bool {
    text.chars().any(|c| (c as u32) <= 31)
}

/// Split text into terms on ASCII spaces. Other whitespace is part of a term.
pub fn tokenize(text: &str) -> Result<Vec<&str>> {
    if has_control_chars(text) {
        return Err(SearchError::InvalidText(text.to_string()));
    }
    Ok(text.split(' ').filter(|word| !word.is_empty()).collect())
}

/// A query word is malformed if it is a bare `-` or starts with `--`.
pub fn is_malformed_minus(word: &str) -> bool {
    match word.strip_prefix('-') {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}
