use std::collections::HashSet;

use crate::data_models::{ExtractedTerm, SearchResult};
use crate::patterns::PatternBank;

/// Distinct canonical terms found in `text`, in bank order then text order.
///
/// Two terms equal under case-insensitive comparison are never both returned.
/// Pure: no state survives between calls.
pub fn extract(text: &str, bank: &PatternBank) -> Vec<String> {
    let mut found = Vec::new();
    if text.trim().is_empty() {
        return found;
    }
    let mut seen = HashSet::new();
    for category in bank.categories() {
        for term in category.find_terms(text) {
            if seen.insert(term.to_lowercase()) {
                found.push(term.to_string());
            }
        }
    }
    found
}

/// Accumulates extracted terms over the search results of one research run.
/// Deduplication is case-insensitive and scoped to the collector.
pub struct TermCollector {
    bank: &'static PatternBank,
    seen: HashSet<String>,
    terms: Vec<ExtractedTerm>,
}

impl TermCollector {
    pub fn new(bank: &'static PatternBank) -> Self {
        Self {
            bank,
            seen: HashSet::new(),
            terms: Vec::new(),
        }
    }

    /// Returns how many new terms the result contributed.
    pub fn collect(&mut self, result: &SearchResult) -> usize {
        let before = self.terms.len();
        for term in extract(&result.text(), self.bank) {
            if self.seen.insert(term.to_lowercase()) {
                self.terms.push(ExtractedTerm::new(term, result));
            }
        }
        self.terms.len() - before
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn into_terms(self) -> Vec<ExtractedTerm> {
        self.terms
    }
}
