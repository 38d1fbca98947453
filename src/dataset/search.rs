use super::CountryMetric;
use std::sync::Arc;

/// Upper bound on prefix suggestions
pub const MAX_SUGGESTIONS: usize = 5;

/// A search hit with its position in feature order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub index: usize,
    pub country: &'a CountryMetric,
}

/// Every country in feature order. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchIndex {
    entries: Vec<Arc<CountryMetric>>,
}

impl SearchIndex {
    pub fn new(entries: Vec<Arc<CountryMetric>>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CountryMetric> {
        self.entries.get(index).map(|c| c.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryMetric> {
        self.entries.iter().map(|c| c.as_ref())
    }

    /// Up to [`MAX_SUGGESTIONS`] names starting with `query`, exact and
    /// case-sensitive, in feature order. An empty query matches nothing.
    pub fn prefix(&self, query: &str) -> Vec<Match<'_>> {
        if query.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name.starts_with(query))
            .take(MAX_SUGGESTIONS)
            .map(|(index, c)| Match { index, country: c })
            .collect()
    }

    /// First country whose name equals `query`
    pub fn exact(&self, query: &str) -> Option<Match<'_>> {
        self.entries
            .iter()
            .position(|c| c.name == query)
            .map(|index| Match {
                index,
                country: &self.entries[index],
            })
    }

    pub fn position_of_code(&self, code: &str) -> Option<usize> {
        self.entries.iter().position(|c| c.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Bounds;

    fn country(name: &str) -> Arc<CountryMetric> {
        Arc::new(CountryMetric {
            code: name.to_uppercase().chars().take(3).collect(),
            name: name.to_string(),
            gdp_usd: None,
            population_count: None,
            gdp_magnitude: None,
            population_magnitude: None,
            gdp_history: Vec::new(),
            population_history: Vec::new(),
            bounds: Bounds::WORLD,
            flag_code: None,
        })
    }

    fn index(names: &[&str]) -> SearchIndex {
        SearchIndex::new(names.iter().map(|n| country(n)).collect())
    }

    fn names(hits: &[Match<'_>]) -> Vec<String> {
        hits.iter().map(|m| m.country.name.clone()).collect()
    }

    #[test]
    fn test_prefix_in_feature_order() {
        let idx = index(&["France", "Gabon", "Germany"]);
        let hits = idx.prefix("G");
        assert_eq!(names(&hits), vec!["Gabon", "Germany"]);
        assert_eq!(hits[0].index, 1);
        assert_eq!(hits[1].index, 2);
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let idx = index(&["France", "Gabon", "Germany"]);
        assert!(idx.prefix("france").is_empty());
        assert!(idx.prefix(" France").is_empty());
    }

    #[test]
    fn test_prefix_capped() {
        let idx = index(&["Sa", "Sb", "Sc", "Sd", "Se", "Sf", "Sg"]);
        assert_eq!(names(&idx.prefix("S")), vec!["Sa", "Sb", "Sc", "Sd", "Se"]);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let idx = index(&["France"]);
        assert!(idx.prefix("").is_empty());
    }

    #[test]
    fn test_exact_match() {
        let idx = index(&["France", "Gabon", "Germany"]);
        let hit = idx.exact("Germany").unwrap();
        assert_eq!(hit.index, 2);
        assert!(idx.exact("Germ").is_none());
    }

    #[test]
    fn test_exact_first_duplicate_wins() {
        let idx = index(&["Niger", "Chad", "Niger"]);
        assert_eq!(idx.exact("Niger").unwrap().index, 0);
        assert_eq!(idx.prefix("Nig").len(), 2);
    }
}
