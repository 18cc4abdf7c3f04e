//! A worked example of a `callsite` component.
//!
//! `Search` finds documents in an in-memory corpus and extracts the terms
//! (companies, people, regions, ...) they mention. [`component`] registers
//! it with overloaded `Find` and `Terms` methods, and the `search-demo`
//! binary drives the full dispatch pipeline from the command line:
//!
//! ```text
//! search-demo Search Find --route query=~ --route limit=3 --query type=rss
//! search-demo Search Terms --query types=company,person --query optimization=sample
//! ```

pub mod component;
pub mod corpus;
mod error;
pub mod search;

pub use component::{component, registry, NAME};
pub use corpus::{Document, Term};
pub use error::SearchError;
pub use search::{DocumentHit, Search, TermCount, DEFAULT_LIMIT};
