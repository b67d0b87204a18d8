//! Selector evaluation
//!
//! Runs a compiled selector against a parsed document and yields matches in
//! document order. Every call starts a fresh traversal, so two blueprint keys
//! whose selectors overlap each see every match.

use crate::document::DocumentQuery;

/// A match and its zero-based position among the selector's matches.
#[derive(Debug, Clone)]
pub struct MatchedElement<E> {
    pub position: usize,
    pub element: E,
}

/// Matches for an already compiled selector. Empty when nothing matches.
pub fn select<'a, D: DocumentQuery>(
    document: &'a D,
    query: &'a D::Query,
) -> impl Iterator<Item = MatchedElement<D::Element<'a>>> + 'a {
    document
        .select(query)
        .enumerate()
        .map(|(position, element)| MatchedElement { position, element })
}
