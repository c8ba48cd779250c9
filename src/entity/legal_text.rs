// src/entity/legal_text.rs
use serde::{Deserialize, Serialize};

use super::RecordBase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LegalTextType {
    #[default]
    Law,
    Decree,
    Regulation,
    Circular,
}

impl std::fmt::Display for LegalTextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegalTextType::Law => write!(f, "law"),
            LegalTextType::Decree => write!(f, "decree"),
            LegalTextType::Regulation => write!(f, "regulation"),
            LegalTextType::Circular => write!(f, "circular"),
        }
    }
}

impl std::str::FromStr for LegalTextType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "law" => Ok(LegalTextType::Law),
            "decree" => Ok(LegalTextType::Decree),
            "regulation" => Ok(LegalTextType::Regulation),
            "circular" => Ok(LegalTextType::Circular),
            _ => Err(format!("Invalid legal text type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LegalTextStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl std::fmt::Display for LegalTextStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegalTextStatus::Draft => write!(f, "draft"),
            LegalTextStatus::Published => write!(f, "published"),
            LegalTextStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for LegalTextStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(LegalTextStatus::Draft),
            "published" => Ok(LegalTextStatus::Published),
            "archived" => Ok(LegalTextStatus::Archived),
            _ => Err(format!("Invalid legal text status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalTextMetadata {
    pub source: Option<String>,
    pub references: Vec<String>,
    pub validity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalText {
    #[serde(flatten)]
    pub base: RecordBase,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub text_type: LegalTextType,
    #[serde(default)]
    pub status: LegalTextStatus,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: LegalTextMetadata,
}

/// Input to `CatalogStore::add_legal_text`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewLegalText {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub text_type: LegalTextType,
    pub status: LegalTextStatus,
    pub category: String,
    pub author: String,
    pub tags: Vec<String>,
    pub metadata: LegalTextMetadata,
}

/// Partial update for a legal text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalTextPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub text_type: Option<LegalTextType>,
    pub status: Option<LegalTextStatus>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<LegalTextMetadata>,
}

impl LegalText {
    pub fn from_draft(base: RecordBase, draft: NewLegalText) -> Self {
        Self {
            base,
            title: draft.title,
            content: draft.content,
            text_type: draft.text_type,
            status: draft.status,
            category: draft.category,
            author: draft.author,
            tags: draft.tags,
            metadata: draft.metadata,
        }
    }

    pub fn apply(&mut self, patch: LegalTextPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(text_type) = patch.text_type {
            self.text_type = text_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
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
        if let Some(metadata) = patch.metadata {
            self.metadata = metadata;
        }
        self.base.touch();
    }
}
