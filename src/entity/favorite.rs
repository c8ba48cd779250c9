// src/entity/favorite.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ItemType;

/// A bookmark on a catalog item, identified by `(item_id, item_type)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub item_id: String,
    pub item_type: ItemType,
    /// Display title copied from the item when it was bookmarked
    #[serde(default)]
    pub title: String,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub item_id: String,
    pub item_type: ItemType,
    #[serde(default)]
    pub title: String,
}

impl Favorite {
    pub fn new(id: String, draft: NewFavorite) -> Self {
        Self {
            id,
            item_id: draft.item_id,
            item_type: draft.item_type,
            title: draft.title,
            date_added: Utc::now(),
        }
    }

    /// Whether this favorite points at the given item.
    pub fn refers_to(&self, item_id: &str, item_type: ItemType) -> bool {
        self.item_id == item_id && self.item_type == item_type
    }
}
