//! Title-based duplicate detection.
//!
//! Two items from the same feed with the same title are treated as the same
//! article, even if their content differs.

use std::collections::HashSet;

/// Known article titles for one (feed, owner) pair.
#[derive(Debug, Default, Clone)]
pub struct DedupIndex {
    titles: HashSet<String>,
}

impl DedupIndex {
    /// Build an index from stored titles.
    pub fn new(titles: impl IntoIterator<Item = String>) -> Self {
        Self {
            titles: titles.into_iter().collect(),
        }
    }

    /// Whether a title is already known.
    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Record a title. Returns `false` if it was already known.
    pub fn insert(&mut self, title: &str) -> bool {
        if self.titles.contains(title) {
            return false;
        }
        self.titles.insert(title.to_string())
    }

    /// Number of known titles.
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Whether no titles are known.
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_titles() {
        let index = DedupIndex::new(vec!["A".to_string(), "B".to_string()]);
        assert!(index.contains("A"));
        assert!(!index.contains("C"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_insert_rejects_repeats() {
        let mut index = DedupIndex::default();
        assert!(index.is_empty());
        assert!(index.insert("Hello"));
        assert!(!index.insert("Hello"));
        assert!(index.contains("Hello"));
    }

    #[test]
    fn test_titles_are_case_sensitive() {
        let index = DedupIndex::new(vec!["Hello".to_string()]);
        assert!(!index.contains("hello"));
    }
}
