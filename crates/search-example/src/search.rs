//! The search component.

use std::collections::{BTreeMap, HashSet};

use callsite::{CallScope, ItemList, ParamError};
use serde::Serialize;
use tracing::debug;

use crate::corpus::Document;
use crate::error::SearchError;

/// Default number of documents returned by `Find(query)`.
pub const DEFAULT_LIMIT: i64 = 10;

/// A matched document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentHit {
    /// Document id.
    pub id: u32,
    /// Headline, used as the RSS item title.
    pub title: String,
    /// Source link.
    pub url: String,
    /// Summary, used as the RSS item description.
    pub summary: String,
}

/// A term and the number of matched documents mentioning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    /// Term name.
    pub name: String,
    /// Term type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Number of analyzed documents containing the term.
    pub documents: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Optimization {
    Full,
    Sample,
}

impl Optimization {
    fn parse(value: Option<&str>) -> Result<Self, SearchError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Optimization::Full),
            Some(v) if v.eq_ignore_ascii_case("sample") => Ok(Optimization::Sample),
            Some(other) => Err(SearchError::UnknownOptimization(other.to_string())),
        }
    }
}

/// Searches documents and extracts terms from the matches.
#[derive(Debug, Clone)]
pub struct Search {
    docs: Vec<Document>,
    count_per_type: usize,
    sample_size: usize,
}

impl Search {
    /// Creates a component over `docs`.
    pub fn new(docs: Vec<Document>) -> Self {
        Self {
            docs,
            count_per_type: 5,
            sample_size: 100,
        }
    }

    /// Sets how many terms are kept per requested type.
    pub fn count_per_type(mut self, count: usize) -> Self {
        self.count_per_type = count;
        self
    }

    /// Sets the maximum number of documents analyzed under `sample`.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    fn matching<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Document> + 'a {
        self.docs.iter().filter(move |d| d.matches(query))
    }

    /// Documents matching `query`, at most `limit` of them.
    pub fn find(&self, query: &str, limit: i64) -> Result<ItemList<DocumentHit>, SearchError> {
        let limit = usize::try_from(limit).map_err(|_| SearchError::InvalidLimit(limit))?;
        let matched: Vec<&Document> = self.matching(query).collect();
        let total = matched.len() as u64;

        let items = matched
            .into_iter()
            .take(limit)
            .map(|d| DocumentHit {
                id: d.id,
                title: d.title.clone(),
                url: d.url.clone(),
                summary: d.summary.clone(),
            })
            .collect();

        Ok(ItemList::new(items)
            .title(format!("Documents matching {query}"))
            .description(format!("Search results for \"{query}\""))
            .total_count(total))
    }

    /// Terms mentioned by documents matching `query`.
    ///
    /// With no `types`, only identified terms are returned, ordered by
    /// document count. With `types`, terms are limited to those types and
    /// partitioned per type, keeping the top terms of each. The `sample`
    /// optimization analyzes an evenly spaced subset of the matches.
    pub fn terms(
        &self,
        query: &str,
        types: &[String],
        optimization: Option<&str>,
    ) -> Result<ItemList<TermCount>, SearchError> {
        let optimization = Optimization::parse(optimization)?;
        let mut docs: Vec<&Document> = self.matching(query).collect();
        if optimization == Optimization::Sample && docs.len() > self.sample_size {
            let step = docs.len().div_ceil(self.sample_size);
            docs = docs.into_iter().step_by(step).collect();
        }
        debug!(query, analyzed = docs.len(), ?optimization, "extracting terms");

        let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        for doc in &docs {
            let mut seen = HashSet::new();
            for term in &doc.terms {
                let keep = if types.is_empty() {
                    term.identified
                } else {
                    types.iter().any(|t| t.eq_ignore_ascii_case(&term.kind))
                };
                if keep && seen.insert((term.kind.as_str(), term.name.as_str())) {
                    *counts.entry((term.kind.as_str(), term.name.as_str())).or_default() += 1;
                }
            }
        }
        let total = counts.len() as u64;

        let mut ranked: Vec<TermCount> = counts
            .into_iter()
            .map(|((kind, name), documents)| TermCount {
                name: name.to_string(),
                kind: kind.to_string(),
                documents,
            })
            .collect();
        ranked.sort_by(|a, b| b.documents.cmp(&a.documents).then_with(|| a.name.cmp(&b.name)));

        let items = if types.is_empty() {
            ranked
        } else {
            types
                .iter()
                .flat_map(|t| {
                    ranked
                        .iter()
                        .filter(|c| c.kind.eq_ignore_ascii_case(t))
                        .take(self.count_per_type)
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .collect()
        };

        let description = match types {
            [] => format!("Terms in documents matching \"{query}\""),
            _ => format!("{} terms in documents matching \"{query}\"", types.join(", ")),
        };
        Ok(ItemList::new(items)
            .title(format!("Terms for {query}"))
            .description(description)
            .total_count(total))
    }

    /// Terms for the current request, reading `query`, `types` and
    /// `optimization` through the resolver chain.
    ///
    /// An empty or absent query searches everything with the `sample`
    /// optimization.
    pub fn terms_in_scope(&self, scope: &CallScope<'_>) -> anyhow::Result<ItemList<TermCount>> {
        let query = scope.try_resolve::<String>("query").filter(|q| !q.is_empty());
        let types = scope.try_resolve::<Vec<String>>("types").unwrap_or_default();
        let optimization = scope.try_resolve::<String>("optimization");

        let (query, optimization) = match query {
            Some(q) => (q, optimization),
            None => (String::from("*"), Some(String::from("sample"))),
        };
        Ok(self.terms(&query, &types, optimization.as_deref())?)
    }
}

/// Rejects an empty query for overloads that take it as an argument.
pub(crate) fn require_query(query: &str) -> Result<(), ParamError> {
    if query.trim().is_empty() {
        return Err(ParamError::missing("query"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus;

    fn search() -> Search {
        Search::new(corpus::sample()).count_per_type(2)
    }

    #[test]
    fn find_limits_and_counts() {
        let list = search().find("acme", 2).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.total_count, Some(4));
        assert_eq!(list.items[0].id, 1);
    }

    #[test]
    fn negative_limit_is_rejected() {
        assert!(matches!(
            search().find("*", -1),
            Err(SearchError::InvalidLimit(-1))
        ));
    }

    #[test]
    fn untyped_terms_are_identified_only() {
        let list = search().terms("*", &[], None).unwrap();
        assert!(list.items.iter().all(|t| t.kind != "keyword"));
        assert_eq!(list.items[0].name, "Acme");
        assert_eq!(list.items[0].documents, 4);
    }

    #[test]
    fn typed_terms_are_partitioned_per_type() {
        let types = vec!["region".to_string(), "company".to_string()];
        let list = search().terms("*", &types, None).unwrap();
        let names: Vec<(&str, &str)> = list
            .items
            .iter()
            .map(|t| (t.kind.as_str(), t.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("region", "Asia"),
                ("region", "Europe"),
                ("company", "Acme"),
                ("company", "Globex"),
            ]
        );
        assert_eq!(list.total_count, Some(5));
    }

    #[test]
    fn sample_analyzes_a_subset() {
        let small = Search::new(corpus::sample()).sample_size(2);
        let full = small.terms("*", &[], None).unwrap();
        let sampled = small.terms("*", &[], Some("sample")).unwrap();
        let acme = |l: &ItemList<TermCount>| {
            l.items
                .iter()
                .find(|t| t.name == "Acme")
                .map(|t| t.documents)
        };
        assert_eq!(acme(&full), Some(4));
        assert!(acme(&sampled).unwrap_or(0) < 4);
    }

    #[test]
    fn unknown_optimization_is_rejected() {
        assert!(matches!(
            search().terms("*", &[], Some("fast")),
            Err(SearchError::UnknownOptimization(o)) if o == "fast"
        ));
    }
}
