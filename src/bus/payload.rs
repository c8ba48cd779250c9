//! Typed payloads for the command catalog.
//!
//! Field names follow the camelCase wire vocabulary of the catalog.

use serde::{Deserialize, Serialize};

use crate::entity::{ItemType, RecordKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalTextRef {
    pub text_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLegalText {
    pub text_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRef {
    pub procedure_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// `read-news` may carry an id, a title, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_title: Option<String>,
}

/// Optional prefill for a creation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefill<T> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchRef {
    pub search_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRef {
    pub template_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequest {
    pub resource_name: String,
    #[serde(default)]
    pub resource_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub document_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmDelete {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub id: String,
}

/// Payload of commands that take no arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::NewLegalText;
    use serde_json::json;

    #[test]
    fn test_confirm_delete_uses_type_key() {
        let payload: ConfirmDelete =
            serde_json::from_value(json!({"type": "saved-search", "id": "s1"})).unwrap();
        assert_eq!(payload.kind, RecordKind::SavedSearch);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"type": "saved-search", "id": "s1"})
        );
    }

    #[test]
    fn test_prefill_is_optional() {
        let empty: Prefill<NewLegalText> = serde_json::from_value(json!({})).unwrap();
        assert!(empty.data.is_none());
        let filled: Prefill<NewLegalText> =
            serde_json::from_value(json!({"data": {"title": "Loi X"}})).unwrap();
        assert_eq!(filled.data.map(|d| d.title), Some("Loi X".to_string()));
    }

    #[test]
    fn test_favorite_request_reads_kebab_item_type() {
        let req: FavoriteRequest = serde_json::from_value(
            json!({"itemType": "legal-text", "itemId": "t1", "itemName": "Loi X"}),
        )
        .unwrap();
        assert_eq!(req.item_type, ItemType::LegalText);
    }
}
