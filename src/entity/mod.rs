mod favorite;
mod legal_text;
mod news;
mod procedure;
mod saved_search;
mod template;

pub use favorite::{Favorite, NewFavorite};
pub use legal_text::{
    LegalText, LegalTextMetadata, LegalTextPatch, LegalTextStatus, LegalTextType, NewLegalText,
};
pub use news::{NewNewsItem, NewsItem, NewsPatch};
pub use procedure::{
    Difficulty, NewProcedure, Procedure, ProcedurePatch, ProcedureStatus, ProcedureStep,
};
pub use saved_search::{NewSavedSearch, SavedSearchPatch, SearchQuery};
pub use template::{DocumentTemplate, NewTemplate, TemplatePatch};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ID_LEN: usize = 10;

/// Generate a short opaque identifier.
pub fn generate_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Identity and timestamps shared by every stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBase {
    pub id: String,
    #[serde(alias = "datePublished")]
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl RecordBase {
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            date_created: now,
            date_modified: now,
        }
    }

    /// Refresh the modification time.
    pub fn touch(&mut self) {
        self.date_modified = Utc::now();
    }
}

/// Kinds of items that can be favorited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    LegalText,
    Procedure,
    News,
    Template,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemType::LegalText => write!(f, "legal-text"),
            ItemType::Procedure => write!(f, "procedure"),
            ItemType::News => write!(f, "news"),
            ItemType::Template => write!(f, "template"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "legal-text" | "legaltext" => Ok(ItemType::LegalText),
            "procedure" => Ok(ItemType::Procedure),
            "news" => Ok(ItemType::News),
            "template" => Ok(ItemType::Template),
            _ => Err(format!("Invalid item type: {}", s)),
        }
    }
}

/// Every deletable collection, including saved searches which cannot be favorited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    LegalText,
    Procedure,
    News,
    Template,
    SavedSearch,
}

impl RecordKind {
    pub fn item_type(self) -> Option<ItemType> {
        match self {
            RecordKind::LegalText => Some(ItemType::LegalText),
            RecordKind::Procedure => Some(ItemType::Procedure),
            RecordKind::News => Some(ItemType::News),
            RecordKind::Template => Some(ItemType::Template),
            RecordKind::SavedSearch => None,
        }
    }
}

impl From<ItemType> for RecordKind {
    fn from(item_type: ItemType) -> Self {
        match item_type {
            ItemType::LegalText => RecordKind::LegalText,
            ItemType::Procedure => RecordKind::Procedure,
            ItemType::News => RecordKind::News,
            ItemType::Template => RecordKind::Template,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.item_type() {
            Some(item_type) => write!(f, "{}", item_type),
            None => write!(f, "saved-search"),
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "saved-search" => Ok(RecordKind::SavedSearch),
            other => other
                .parse::<ItemType>()
                .map(RecordKind::from)
                .map_err(|_| format!("Invalid record kind: {}", s)),
        }
    }
}

/// Split a comma separated list, dropping blanks.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_short_and_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_eq!(a.len(), ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_item_type_round_trips_through_strings() {
        for item_type in [
            ItemType::LegalText,
            ItemType::Procedure,
            ItemType::News,
            ItemType::Template,
        ] {
            assert_eq!(item_type.to_string().parse::<ItemType>(), Ok(item_type));
        }
        assert!("message".parse::<ItemType>().is_err());
    }

    #[test]
    fn test_record_kind_parses_saved_search() {
        assert_eq!("saved-search".parse::<RecordKind>(), Ok(RecordKind::SavedSearch));
        assert_eq!("legal-text".parse::<RecordKind>(), Ok(RecordKind::LegalText));
        assert_eq!(RecordKind::SavedSearch.item_type(), None);
        assert_eq!(RecordKind::News.to_string(), "news");
    }

    #[test]
    fn test_item_type_serializes_kebab_case() {
        let json = serde_json::to_string(&ItemType::LegalText).unwrap();
        assert_eq!(json, "\"legal-text\"");
    }

    #[test]
    fn test_split_list_trims_and_drops_blanks() {
        assert_eq!(split_list(" a, b ,, c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
