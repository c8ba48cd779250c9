// src/entity/procedure.rs
use serde::{Deserialize, Serialize};

use super::RecordBase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Invalid difficulty: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureStatus {
    #[default]
    Active,
    Inactive,
    UnderReview,
}

impl std::fmt::Display for ProcedureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcedureStatus::Active => write!(f, "active"),
            ProcedureStatus::Inactive => write!(f, "inactive"),
            ProcedureStatus::UnderReview => write!(f, "under_review"),
        }
    }
}

impl std::str::FromStr for ProcedureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "active" => Ok(ProcedureStatus::Active),
            "inactive" => Ok(ProcedureStatus::Inactive),
            "under_review" | "underreview" => Ok(ProcedureStatus::UnderReview),
            _ => Err(format!("Invalid procedure status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcedureStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub order: u32,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
}

impl ProcedureStep {
    pub fn new(order: u32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: order.to_string(),
            title: title.into(),
            description: description.into(),
            order,
            is_required: true,
            documents: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    #[serde(flatten)]
    pub base: RecordBase,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<ProcedureStep>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub status: ProcedureStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProcedure {
    pub title: String,
    pub description: String,
    pub steps: Vec<ProcedureStep>,
    pub category: String,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub required_documents: Vec<String>,
    pub status: ProcedureStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcedurePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps: Option<Vec<ProcedureStep>>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub estimated_time: Option<String>,
    pub required_documents: Option<Vec<String>>,
    pub status: Option<ProcedureStatus>,
}

/// Give unnumbered steps their position and an id.
fn normalize_steps(steps: &mut [ProcedureStep]) {
    for (index, step) in steps.iter_mut().enumerate() {
        let position = index as u32 + 1;
        if step.order == 0 {
            step.order = position;
        }
        if step.id.is_empty() {
            step.id = step.order.to_string();
        }
    }
}

impl Procedure {
    pub fn from_draft(base: RecordBase, draft: NewProcedure) -> Self {
        let mut steps = draft.steps;
        normalize_steps(&mut steps);
        Self {
            base,
            title: draft.title,
            description: draft.description,
            steps,
            category: draft.category,
            difficulty: draft.difficulty,
            estimated_time: draft.estimated_time,
            required_documents: draft.required_documents,
            status: draft.status,
        }
    }

    pub fn apply(&mut self, patch: ProcedurePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(mut steps) = patch.steps {
            normalize_steps(&mut steps);
            self.steps = steps;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(estimated_time) = patch.estimated_time {
            self.estimated_time = estimated_time;
        }
        if let Some(required_documents) = patch.required_documents {
            self.required_documents = required_documents;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.base.touch();
    }

    /// Steps sorted by their declared order.
    pub fn ordered_steps(&self) -> Vec<&ProcedureStep> {
        let mut steps: Vec<&ProcedureStep> = self.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_numbers_steps() {
        let draft = NewProcedure {
            title: "Carte grise".to_string(),
            steps: vec![
                ProcedureStep {
                    title: "Remplir".to_string(),
                    ..Default::default()
                },
                ProcedureStep {
                    title: "Déposer".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let procedure = Procedure::from_draft(RecordBase::new("p1".to_string()), draft);
        assert_eq!(procedure.steps[0].order, 1);
        assert_eq!(procedure.steps[1].order, 2);
        assert_eq!(procedure.steps[1].id, "2");
    }

    #[test]
    fn test_status_uses_snake_case() {
        let json = serde_json::to_string(&ProcedureStatus::UnderReview).unwrap();
        assert_eq!(json, "\"under_review\"");
        assert_eq!("under-review".parse::<ProcedureStatus>(), Ok(ProcedureStatus::UnderReview));
    }

    #[test]
    fn test_ordered_steps_sorts_by_order() {
        let mut procedure = Procedure::from_draft(
            RecordBase::new("p1".to_string()),
            NewProcedure::default(),
        );
        procedure.steps = vec![ProcedureStep::new(2, "b", ""), ProcedureStep::new(1, "a", "")];
        let titles: Vec<&str> = procedure.ordered_steps().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }
}
