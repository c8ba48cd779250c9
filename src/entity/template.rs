// src/entity/template.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::RecordBase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTemplate {
    #[serde(flatten)]
    pub base: RecordBase,
    pub name: String,
    /// Template text with `{{variable}}` placeholders
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    /// Variable names expected by this template
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub usage_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTemplate {
    pub name: String,
    pub content: String,
    pub category: String,
    /// Left empty to derive from the placeholders in `content`
    pub variables: Vec<String>,
    pub is_public: bool,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub variables: Option<Vec<String>>,
    pub is_public: Option<bool>,
}

/// Placeholder names in order of first appearance.
pub fn placeholders(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = after[..end].trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &after[end + 2..];
    }
    names
}

impl DocumentTemplate {
    pub fn from_draft(base: RecordBase, draft: NewTemplate) -> Self {
        let variables = if draft.variables.is_empty() {
            placeholders(&draft.content)
        } else {
            draft.variables
        };
        Self {
            base,
            name: draft.name,
            content: draft.content,
            category: draft.category,
            variables,
            is_public: draft.is_public,
            created_by: draft.created_by,
            usage_count: 0,
        }
    }

    pub fn apply(&mut self, patch: TemplatePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(content) = patch.content {
            if patch.variables.is_none() {
                self.variables = placeholders(&content);
            }
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(variables) = patch.variables {
            self.variables = variables;
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
        self.base.touch();
    }

    /// Fill placeholders with `values`; unknown placeholders are left as written.
    pub fn render(&self, values: &BTreeMap<String, String>) -> String {
        let mut out = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = after[..end].trim();
            match values.get(name) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}
