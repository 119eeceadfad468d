//! Category and free-text filtering over credential metadata.
//!
//! Matching only looks at `title`, `username`, and `category`. Ciphertext is
//! never inspected, so no key is needed to search.

use serde::{Deserialize, Serialize};

use crate::types::CredentialRecord;

/// Filter parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Case-insensitive exact category match. `None` matches every category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Case-insensitive substring of title or username. Empty matches everything.
    #[serde(default)]
    pub search: String,
}

impl Query {
    /// A query that matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the search term.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Whether a single record passes the filter.
    pub fn matches(&self, record: &CredentialRecord) -> bool {
        Matcher::new(self).matches(record)
    }
}

/// A query with its terms case-folded once up front.
struct Matcher {
    category: Option<String>,
    search: String,
}

impl Matcher {
    fn new(query: &Query) -> Self {
        Self {
            category: query.category.as_deref().map(str::to_lowercase),
            search: query.search.to_lowercase(),
        }
    }

    fn matches(&self, record: &CredentialRecord) -> bool {
        let category_ok = match &self.category {
            Some(category) => record.category.to_lowercase() == *category,
            None => true,
        };

        category_ok
            && (self.search.is_empty()
                || record.title.to_lowercase().contains(&self.search)
                || record.username.to_lowercase().contains(&self.search))
    }
}

/// Stable filter: matching records in their input order.
pub fn filter(records: &[CredentialRecord], query: &Query) -> Vec<CredentialRecord> {
    let matcher = Matcher::new(query);
    records
        .iter()
        .filter(|record| matcher.matches(record))
        .cloned()
        .collect()
}
