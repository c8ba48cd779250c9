// src/entity/saved_search.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecordBase;
use crate::search::Filters;

/// A saved search, replayable against the whole catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(flatten)]
    pub base: RecordBase,
    pub name: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub filters: Filters,
    pub last_used: DateTime<Utc>,
    #[serde(default)]
    pub use_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSavedSearch {
    pub name: String,
    pub query: String,
    pub filters: Filters,
}

/// Editable fields of a saved search. Usage statistics are only moved by execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedSearchPatch {
    pub name: Option<String>,
    pub query: Option<String>,
    pub filters: Option<Filters>,
}

impl SearchQuery {
    pub fn from_draft(base: RecordBase, draft: NewSavedSearch) -> Self {
        Self {
            last_used: base.date_created,
            base,
            name: draft.name,
            query: draft.query,
            filters: draft.filters,
            use_count: 0,
        }
    }

    pub fn apply(&mut self, patch: SavedSearchPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(query) = patch.query {
            self.query = query;
        }
        if let Some(filters) = patch.filters {
            self.filters = filters;
        }
        self.base.touch();
    }

    /// Count one execution.
    pub fn record_use(&mut self) {
        self.use_count += 1;
        self.last_used = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_search_starts_unused() {
        let search = SearchQuery::from_draft(
            RecordBase::new("s1".to_string()),
            NewSavedSearch {
                name: "S1".to_string(),
                query: "commerce".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(search.use_count, 0);
        assert_eq!(search.last_used, search.base.date_created);
    }

    #[test]
    fn test_record_use_increments_and_stamps() {
        let mut search = SearchQuery::from_draft(
            RecordBase::new("s1".to_string()),
            NewSavedSearch::default(),
        );
        let before = search.last_used;
        search.record_use();
        search.record_use();
        assert_eq!(search.use_count, 2);
        assert!(search.last_used >= before);
    }
}
