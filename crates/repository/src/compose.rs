//! Composition of a search clause with a backend's base predicate.

use domain::Filter;

/// Builds backend-native predicates for free-text search.
pub trait Composer {
    type Predicate;

    /// Disjunction matching `term` as a substring of any of `fields`.
    fn search(&self, fields: &[String], term: &str) -> Option<Self::Predicate>;

    /// Conjunction of an optional base predicate with `clause`.
    fn and(&self, base: Option<Self::Predicate>, clause: Self::Predicate) -> Self::Predicate;
}

/// Search term to apply, if both a query and searchable fields exist.
pub fn search_term<'a>(filter: &'a Filter, fields: &[String]) -> Option<&'a str> {
    if fields.is_empty() {
        return None;
    }
    filter.query()
}

/// Combine `base` with the filter's search clause.
///
/// Without a query or searchable fields the base predicate is returned as is.
pub fn compose<C: Composer>(
    composer: &C,
    base: Option<C::Predicate>,
    filter: &Filter,
    fields: &[String],
) -> Option<C::Predicate> {
    let Some(term) = search_term(filter, fields) else {
        return base;
    };

    match composer.search(fields, term) {
        Some(clause) => Some(composer.and(base, clause)),
        None => base,
    }
}
