use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{LexdeskError, Result};

/// A named command with a structured payload
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub payload: Value,
}

impl Command {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Build a command from a typed payload.
    pub fn with<T: Serialize>(name: impl Into<String>, payload: &T) -> Result<Self> {
        Ok(Self::new(name, serde_json::to_value(payload)?))
    }

    /// Decode the payload. A `null` payload is read as an empty object.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        let payload = match &self.payload {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        serde_json::from_value(payload).map_err(|e| LexdeskError::InvalidPayload {
            command: self.name.clone(),
            message: e.to_string(),
        })
    }
}

pub mod names {
    pub const VIEW_LEGAL_TEXT: &str = "view-legal-text";
    pub const DOWNLOAD_LEGAL_TEXT: &str = "download-legal-text";
    pub const SHARE_LEGAL_TEXT: &str = "share-legal-text";
    pub const ADD_LEGAL_TEXT: &str = "add-legal-text";
    pub const EDIT_LEGAL_TEXT: &str = "edit-legal-text";
    pub const DELETE_LEGAL_TEXT: &str = "delete-legal-text";

    pub const VIEW_PROCEDURE: &str = "view-procedure";
    pub const ADD_PROCEDURE: &str = "add-procedure";
    pub const EDIT_PROCEDURE: &str = "edit-procedure";
    pub const DELETE_PROCEDURE: &str = "delete-procedure";

    pub const READ_NEWS: &str = "read-news";
    pub const ADD_NEWS: &str = "add-news";
    pub const EDIT_NEWS: &str = "edit-news";
    pub const DELETE_NEWS: &str = "delete-news";

    pub const IMMERSIVE_SEARCH: &str = "immersive-search";
    pub const SAVE_SEARCH: &str = "save-search";
    pub const EXECUTE_SAVED_SEARCH: &str = "execute-saved-search";
    pub const EDIT_SAVED_SEARCH: &str = "edit-saved-search";
    pub const DELETE_SAVED_SEARCH: &str = "delete-saved-search";

    pub const ADD_TO_FAVORITES: &str = "add-to-favorites";
    pub const REMOVE_FROM_FAVORITES: &str = "remove-from-favorites";
    pub const VIEW_FAVORITES: &str = "view-favorites";

    pub const CREATE_TEMPLATE: &str = "create-template";
    pub const USE_TEMPLATE: &str = "use-template";
    pub const EDIT_TEMPLATE: &str = "edit-template";
    pub const DELETE_TEMPLATE: &str = "delete-template";

    pub const DOWNLOAD_RESOURCE: &str = "download-resource";
    pub const EXPORT_DATA: &str = "export-data";
    pub const IMPORT_DATA: &str = "import-data";

    pub const APPROVE_DOCUMENT: &str = "approve-document";
    pub const REJECT_DOCUMENT: &str = "reject-document";
    pub const REQUEST_CHANGES_DOCUMENT: &str = "request-changes-document";

    /// Answered by at most one outstanding delete confirmation.
    pub const CONFIRM_DELETE: &str = "confirm-delete";
}

/// Every command name with its payload fields, in catalog order.
pub const CATALOG: &[(&str, &str)] = &[
    (names::VIEW_LEGAL_TEXT, "textId, title"),
    (names::DOWNLOAD_LEGAL_TEXT, "textId, title, format"),
    (names::SHARE_LEGAL_TEXT, "textId, title"),
    (names::ADD_LEGAL_TEXT, "data"),
    (names::EDIT_LEGAL_TEXT, "textId"),
    (names::DELETE_LEGAL_TEXT, "textId"),
    (names::VIEW_PROCEDURE, "procedureId, title"),
    (names::ADD_PROCEDURE, "data"),
    (names::EDIT_PROCEDURE, "procedureId"),
    (names::DELETE_PROCEDURE, "procedureId"),
    (names::READ_NEWS, "newsId, newsTitle"),
    (names::ADD_NEWS, "data"),
    (names::EDIT_NEWS, "newsId"),
    (names::DELETE_NEWS, "newsId"),
    (names::IMMERSIVE_SEARCH, "searchType, query"),
    (names::SAVE_SEARCH, "name, query, filters"),
    (names::EXECUTE_SAVED_SEARCH, "searchId"),
    (names::EDIT_SAVED_SEARCH, "searchId"),
    (names::DELETE_SAVED_SEARCH, "searchId"),
    (names::ADD_TO_FAVORITES, "itemType, itemId, itemName"),
    (names::REMOVE_FROM_FAVORITES, "itemType, itemId"),
    (names::VIEW_FAVORITES, "itemType"),
    (names::CREATE_TEMPLATE, "data"),
    (names::USE_TEMPLATE, "templateId"),
    (names::EDIT_TEMPLATE, "templateId"),
    (names::DELETE_TEMPLATE, "templateId"),
    (names::DOWNLOAD_RESOURCE, "resourceName, resourceType"),
    (names::EXPORT_DATA, ""),
    (names::IMPORT_DATA, ""),
    (names::APPROVE_DOCUMENT, "documentId, documentTitle"),
    (names::REJECT_DOCUMENT, "documentId, documentTitle"),
    (names::REQUEST_CHANGES_DOCUMENT, "documentId, documentTitle"),
    (names::CONFIRM_DELETE, "type, id"),
];

pub fn is_known(name: &str) -> bool {
    CATALOG.iter().any(|(known, _)| *known == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct TextRef {
        text_id: String,
        #[serde(default)]
        title: Option<String>,
    }

    #[test]
    fn test_parse_typed_payload() {
        let cmd = Command::new(names::VIEW_LEGAL_TEXT, json!({"textId": "t1"}));
        let text_ref: TextRef = cmd.parse().unwrap();
        assert_eq!(text_ref.text_id, "t1");
        assert_eq!(text_ref.title, None);
    }

    #[test]
    fn test_parse_reports_command_name() {
        let cmd = Command::new(names::VIEW_LEGAL_TEXT, json!({"title": "x"}));
        match cmd.parse::<TextRef>() {
            Err(LexdeskError::InvalidPayload { command, .. }) => {
                assert_eq!(command, names::VIEW_LEGAL_TEXT)
            }
            other => panic!("expected invalid payload, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut seen: Vec<&str> = CATALOG.iter().map(|(n, _)| *n).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), CATALOG.len());
        assert!(is_known("confirm-delete"));
        assert!(!is_known("navigate-to-section"));
    }
}
