// src/entity/news.rs
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::RecordBase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(flatten)]
    pub base: RecordBase,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_important: bool,
    /// Users who have read this item
    #[serde(default)]
    pub read_by: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewNewsItem {
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub tags: Vec<String>,
    pub is_important: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_important: Option<bool>,
}

impl NewsItem {
    pub fn from_draft(base: RecordBase, draft: NewNewsItem) -> Self {
        Self {
            base,
            title: draft.title,
            content: draft.content,
            category: draft.category,
            author: draft.author,
            tags: draft.tags,
            is_important: draft.is_important,
            read_by: BTreeSet::new(),
        }
    }

    pub fn apply(&mut self, patch: NewsPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(is_important) = patch.is_important {
            self.is_important = is_important;
        }
        self.base.touch();
    }

    /// Record that `user` has read this item. Returns false if already recorded.
    pub fn mark_read(&mut self, user: &str) -> bool {
        self.read_by.insert(user.to_string())
    }

    pub fn is_read_by(&self, user: &str) -> bool {
        self.read_by.contains(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_read_is_a_set_insert() {
        let mut item = NewsItem::from_draft(RecordBase::new("n1".to_string()), NewNewsItem::default());
        assert!(item.mark_read("user-1"));
        assert!(!item.mark_read("user-1"));
        assert_eq!(item.read_by.len(), 1);
        assert!(item.is_read_by("user-1"));
    }

    #[test]
    fn test_read_by_serializes_as_array() {
        let mut item = NewsItem::from_draft(RecordBase::new("n1".to_string()), NewNewsItem::default());
        item.mark_read("b");
        item.mark_read("a");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["readBy"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_accepts_date_published_alias() {
        let json = r#"{
            "id": "n1",
            "datePublished": "2024-01-01T00:00:00Z",
            "dateModified": "2024-01-01T00:00:00Z",
            "title": "Réforme",
            "readBy": ["u1", "u1"]
        }"#;
        let item: NewsItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.title, "Réforme");
        assert_eq!(item.read_by.len(), 1);
    }
}
