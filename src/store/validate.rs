//! Field checks applied at the store boundary when strict validation is on.

use crate::entity::{
    LegalTextPatch, NewFavorite, NewLegalText, NewNewsItem, NewProcedure, NewSavedSearch,
    NewTemplate, NewsPatch, ProcedurePatch, ProcedureStep, SavedSearchPatch, TemplatePatch,
};
use crate::error::ValidationError;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn required_if_set(field: &str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(v) => required(field, v),
        None => Ok(()),
    }
}

fn steps(steps: &[ProcedureStep]) -> Result<(), ValidationError> {
    for (index, step) in steps.iter().enumerate() {
        if step.title.trim().is_empty() {
            return Err(ValidationError::new(
                format!("steps[{}].title", index),
                "must not be empty",
            ));
        }
    }
    Ok(())
}

impl Validate for NewLegalText {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

impl Validate for LegalTextPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        required_if_set("title", &self.title)
    }
}

impl Validate for NewProcedure {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        steps(&self.steps)
    }
}

impl Validate for ProcedurePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        required_if_set("title", &self.title)?;
        match &self.steps {
            Some(s) => steps(s),
            None => Ok(()),
        }
    }
}

impl Validate for NewNewsItem {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)
    }
}

impl Validate for NewsPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        required_if_set("title", &self.title)
    }
}

impl Validate for NewSavedSearch {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }
}

impl Validate for SavedSearchPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        required_if_set("name", &self.name)
    }
}

impl Validate for NewFavorite {
    fn validate(&self) -> Result<(), ValidationError> {
        required("itemId", &self.item_id)
    }
}

impl Validate for NewTemplate {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }
}

impl Validate for TemplatePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        required_if_set("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_is_rejected() {
        let draft = NewLegalText {
            title: "   ".to_string(),
            ..Default::default()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field, "title");
    }

    #[test]
    fn test_patch_without_title_passes() {
        assert!(LegalTextPatch::default().validate().is_ok());
        let patch = LegalTextPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_step_titles_are_checked() {
        let draft = NewProcedure {
            title: "Passeport".to_string(),
            steps: vec![ProcedureStep::new(1, "Formulaire", ""), ProcedureStep::new(2, "", "")],
            ..Default::default()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field, "steps[1].title");
    }
}
