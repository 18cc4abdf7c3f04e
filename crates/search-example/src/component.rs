//! Method table for the `Search` component.

use callsite::{CallScope, ComponentRegistry, ComponentType, RegistryError};

use crate::search::{require_query, Search, DEFAULT_LIMIT};

/// Name the component is registered under.
pub const NAME: &str = "Search";

/// Builds the `Search` method table.
///
/// | Overload | Behavior |
/// |----------|----------|
/// | `Find(query: string, limit: int)` | matching documents |
/// | `Find(query: string)` | matching documents, default limit |
/// | `Terms()` | terms, inputs resolved from the request |
/// | `Terms(query: string)` | identified terms |
/// | `Terms(query: string, types: string[], optimization: string)` | terms per type |
pub fn component(search: Search) -> ComponentType<Search> {
    ComponentType::new(search)
        .method("Find", &["query", "limit"], |s: &Search, query: String, limit: i64| {
            require_query(&query)?;
            Ok::<_, anyhow::Error>(s.find(&query, limit)?)
        })
        .method("Find", &["query"], |s: &Search, query: String| {
            require_query(&query)?;
            Ok::<_, anyhow::Error>(s.find(&query, DEFAULT_LIMIT)?)
        })
        .scoped_method("Terms", &[], |s: &Search, scope: &CallScope<'_>| {
            s.terms_in_scope(scope)
        })
        .method("Terms", &["query"], |s: &Search, query: String| {
            require_query(&query)?;
            Ok::<_, anyhow::Error>(s.terms(&query, &[], None)?)
        })
        .method(
            "Terms",
            &["query", "types", "optimization"],
            |s: &Search, query: String, types: Vec<String>, optimization: String| {
                require_query(&query)?;
                Ok::<_, anyhow::Error>(s.terms(&query, &types, Some(optimization.as_str()))?)
            },
        )
}

/// A registry holding only the `Search` component.
pub fn registry(search: Search) -> Result<ComponentRegistry, RegistryError> {
    let mut registry = ComponentRegistry::new();
    registry.register(NAME, component(search))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus;

    #[test]
    fn method_table() {
        let registry = registry(Search::new(corpus::sample())).unwrap();
        let search = registry.resolve(NAME).unwrap();

        let find: Vec<String> = search.signatures("Find").map(|s| s.to_string()).collect();
        assert_eq!(find, vec!["Find(string, int)", "Find(string)"]);

        let terms: Vec<String> = search.signatures("Terms").map(|s| s.describe()).collect();
        assert_eq!(
            terms,
            vec![
                "Terms()",
                "Terms(query: string)",
                "Terms(query: string, types: string[], optimization: string)",
            ]
        );
    }
}
