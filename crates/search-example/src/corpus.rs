//! In-memory document corpus.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// A named entity or keyword extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Display name.
    pub name: String,
    /// Entity type, e.g. `company` or `person`.
    #[serde(rename = "type")]
    pub kind: String,
    /// False for plain keywords that were not matched to a known entity.
    #[serde(default = "identified_default")]
    pub identified: bool,
}

fn identified_default() -> bool {
    true
}

impl Term {
    /// An identified entity.
    pub fn entity(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            identified: true,
        }
    }

    /// An unidentified keyword.
    pub fn keyword(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: String::from("keyword"),
            identified: false,
        }
    }
}

/// A searchable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier.
    pub id: u32,
    /// Headline.
    pub title: String,
    /// Source link.
    pub url: String,
    /// Short summary.
    #[serde(default)]
    pub summary: String,
    /// Extracted terms.
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl Document {
    /// Returns true if every whitespace-separated token of `query` occurs in
    /// the title, summary or a term name, ignoring case. `*` matches all.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || query == "*" {
            return true;
        }
        let title = self.title.to_lowercase();
        let summary = self.summary.to_lowercase();
        query.split_whitespace().all(|token| {
            let token = token.to_lowercase();
            title.contains(&token)
                || summary.contains(&token)
                || self.terms.iter().any(|t| t.name.to_lowercase().contains(&token))
        })
    }
}

/// Reads a JSON array of documents.
pub fn load(path: &Path) -> Result<Vec<Document>, SearchError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn doc(id: u32, title: &str, summary: &str, terms: Vec<Term>) -> Document {
    Document {
        id,
        title: title.to_string(),
        url: format!("https://news.example.org/{id}"),
        summary: summary.to_string(),
        terms,
    }
}

/// A small built-in corpus.
pub fn sample() -> Vec<Document> {
    vec![
        doc(
            1,
            "Acme acquires Globex in record deal",
            "The merger creates the largest widget maker in Europe.",
            vec![
                Term::entity("Acme", "company"),
                Term::entity("Globex", "company"),
                Term::entity("Europe", "region"),
                Term::keyword("merger"),
            ],
        ),
        doc(
            2,
            "Globex chief executive steps down",
            "Hank Scorpio leaves after the Acme deal closes.",
            vec![
                Term::entity("Globex", "company"),
                Term::entity("Hank Scorpio", "person"),
                Term::entity("Acme", "company"),
            ],
        ),
        doc(
            3,
            "Rust adoption grows in embedded systems",
            "Vendors in Europe and Asia report more Rust firmware.",
            vec![
                Term::entity("Europe", "region"),
                Term::entity("Asia", "region"),
                Term::keyword("firmware"),
            ],
        ),
        doc(
            4,
            "Initech opens research lab in Berlin",
            "Bill Lumbergh announced the lab alongside Acme executives.",
            vec![
                Term::entity("Initech", "company"),
                Term::entity("Berlin", "city"),
                Term::entity("Bill Lumbergh", "person"),
                Term::entity("Acme", "company"),
            ],
        ),
        doc(
            5,
            "Storm delays shipping across Asia",
            "Ports report backlogs as carriers reroute vessels.",
            vec![Term::entity("Asia", "region"), Term::keyword("shipping")],
        ),
        doc(
            6,
            "Acme quarterly results beat estimates",
            "Strong widget demand in Asia lifts revenue.",
            vec![
                Term::entity("Acme", "company"),
                Term::entity("Asia", "region"),
                Term::keyword("revenue"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn matching_is_token_based_and_case_insensitive() {
        let docs = sample();
        let hits: Vec<u32> = docs
            .iter()
            .filter(|d| d.matches("acme DEAL"))
            .map(|d| d.id)
            .collect();
        assert_eq!(hits, vec![1, 2]);
        assert!(docs.iter().all(|d| d.matches("*")));
    }

    #[test]
    fn term_names_are_searchable() {
        let docs = sample();
        assert!(docs[1].matches("scorpio"));
        assert!(!docs[0].matches("scorpio"));
    }

    #[test]
    fn load_reads_json_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 9, "title": "Hello", "url": "u", "terms": [{{"name": "Ada", "type": "person"}}]}}]"#
        )
        .unwrap();

        let docs = load(file.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].terms[0].identified);
        assert_eq!(docs[0].summary, "");
    }

    #[test]
    fn load_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(load(file.path()), Err(SearchError::Corpus(_))));
    }
}
