//! Search predicates, filter maps and query-string parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{DocumentTemplate, LegalText, NewsItem, Procedure};

/// Field name to required value. Falsy values (`null`, `false`, `0`, `""`) impose no constraint.
pub type Filters = BTreeMap<String, Value>;

/// Filter keys recognized in a raw query string.
pub const FILTER_KEYS: &[&str] = &["type", "status", "category", "author", "difficulty"];

/// A record that can be matched by the catalog's substring search.
pub trait Searchable: Serialize {
    /// Free-text fields checked against the query.
    fn text_fields(&self) -> Vec<&str>;

    fn tags(&self) -> &[String] {
        &[]
    }
}

impl Searchable for LegalText {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Searchable for Procedure {
    fn text_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = vec![self.title.as_str(), self.description.as_str()];
        for step in &self.steps {
            fields.push(&step.title);
            fields.push(&step.description);
        }
        fields
    }
}

impl Searchable for NewsItem {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str()]
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Searchable for DocumentTemplate {
    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.content.as_str()]
    }
}

fn contains_ci(text: &str, needle_lower: &str) -> bool {
    text.to_lowercase().contains(needle_lower)
}

/// True when any text field or tag contains `query`, ignoring case.
pub fn matches_query<T: Searchable>(record: &T, query: &str) -> bool {
    let needle = query.to_lowercase();
    record.text_fields().iter().any(|f| contains_ci(f, &needle))
        || record.tags().iter().any(|t| contains_ci(t, &needle))
}

/// Whether a filter value should be ignored.
pub fn is_unconstrained(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// True when every constraining filter equals the record's serialized field.
pub fn matches_filters<T: Serialize>(record: &T, filters: &Filters) -> bool {
    let active: Vec<(&String, &Value)> = filters
        .iter()
        .filter(|(_, value)| !is_unconstrained(value))
        .collect();
    if active.is_empty() {
        return true;
    }
    let Ok(serialized) = serde_json::to_value(record) else {
        return false;
    };
    active
        .into_iter()
        .all(|(key, expected)| serialized.get(key) == Some(expected))
}

/// Apply the query and filter predicates to a collection.
pub fn filter_records<T: Searchable + Clone>(records: &[T], query: &str, filters: &Filters) -> Vec<T> {
    records
        .iter()
        .filter(|r| matches_query(*r, query) && matches_filters(*r, filters))
        .cloned()
        .collect()
}

/// Matches grouped by searchable collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub legal_texts: Vec<LegalText>,
    pub procedures: Vec<Procedure>,
    pub news: Vec<NewsItem>,
    pub templates: Vec<DocumentTemplate>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.legal_texts.len() + self.procedures.len() + self.news.len() + self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a raw query string into (remaining query text, filters).
///
/// Tokens shaped like `key:value` whose key is one of [`FILTER_KEYS`] become filters.
///
/// ```ignore
/// let (query, filters) = parse_query("type:law status:published commerce");
/// assert_eq!(query, "commerce");
/// assert_eq!(filters["type"], "law");
/// ```
pub fn parse_query(raw: &str) -> (String, Filters) {
    let mut filters = Filters::new();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        match token.split_once(':') {
            Some((key, value)) if FILTER_KEYS.contains(&key) && !value.is_empty() => {
                filters.insert(key.to_string(), Value::String(value.to_string()));
            }
            _ => remaining.push(token),
        }
    }

    (remaining.join(" "), filters)
}
