//! Stand-in records for ids the store does not know.
//!
//! View workflows show these instead of failing, so triggers pointing at sample ids
//! still open something. Synthesized records are never stored.

use crate::entity::{
    Difficulty, LegalText, LegalTextMetadata, LegalTextStatus, LegalTextType, NewsItem,
    Procedure, ProcedureStatus, ProcedureStep, RecordBase,
};

const DEFAULT_TEXT_TITLE: &str = "Legal document";
const DEFAULT_PROCEDURE_TITLE: &str = "Administrative procedure";
const DEFAULT_NEWS_TITLE: &str = "Legal news";
const SYSTEM_AUTHOR: &str = "System";
const GENERAL_CATEGORY: &str = "General";

fn title_or(title: Option<&str>, fallback: &str) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => fallback.to_string(),
    }
}

/// Article-structured body used for synthesized legal texts.
pub fn example_legal_content(title: &str) -> String {
    format!(
        "{title}\n\n\
         Article 1 - Purpose\n\
         This document sets out the rules and procedures that apply to {title}.\n\n\
         Article 2 - Scope\n\
         These provisions apply to every case within its competence.\n\n\
         Article 3 - Implementation\n\
         Implementation details are laid down by the corresponding implementing texts.\n\n\
         Article 4 - Entry into force\n\
         This document enters into force on the date of its publication."
    )
}

pub fn synthesize_legal_text(id: &str, title: Option<&str>) -> LegalText {
    let title = title_or(title, DEFAULT_TEXT_TITLE);
    LegalText {
        base: RecordBase::new(id.to_string()),
        content: example_legal_content(&title),
        title,
        text_type: LegalTextType::Law,
        status: LegalTextStatus::Published,
        category: GENERAL_CATEGORY.to_string(),
        author: SYSTEM_AUTHOR.to_string(),
        tags: vec!["example".to_string(), "legal".to_string()],
        metadata: LegalTextMetadata {
            source: Some("Automatic system".to_string()),
            references: Vec::new(),
            validity: Some("In force".to_string()),
        },
    }
}

fn example_steps() -> Vec<ProcedureStep> {
    let mut prepare = ProcedureStep::new(
        1,
        "Prepare the documents",
        "Gather every document the procedure requires",
    );
    prepare.documents = Some(vec![
        "Identity document".to_string(),
        "Proof of address".to_string(),
    ]);
    let submit = ProcedureStep::new(
        2,
        "Submit the application",
        "File the application with the competent office",
    );
    let mut follow_up = ProcedureStep::new(3, "Follow up", "Track the progress of the application");
    follow_up.is_required = false;
    vec![prepare, submit, follow_up]
}

pub fn synthesize_procedure(id: &str, title: Option<&str>) -> Procedure {
    Procedure {
        base: RecordBase::new(id.to_string()),
        title: title_or(title, DEFAULT_PROCEDURE_TITLE),
        description: "Description of the administrative procedure".to_string(),
        steps: example_steps(),
        category: GENERAL_CATEGORY.to_string(),
        difficulty: Difficulty::Medium,
        estimated_time: "30 minutes".to_string(),
        required_documents: vec![
            "Identity document".to_string(),
            "Proof of address".to_string(),
        ],
        status: ProcedureStatus::Active,
    }
}

pub fn synthesize_news(id: &str, title: Option<&str>) -> NewsItem {
    NewsItem {
        base: RecordBase::new(id.to_string()),
        title: title_or(title, DEFAULT_NEWS_TITLE),
        content: "This news item covers the latest legal and regulatory developments."
            .to_string(),
        category: "Legal".to_string(),
        author: "Editorial team".to_string(),
        tags: Vec::new(),
        is_important: false,
        read_by: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_text_keeps_requested_title() {
        let text = synthesize_legal_text("unknown-id", Some("Ghost"));
        assert_eq!(text.base.id, "unknown-id");
        assert_eq!(text.title, "Ghost");
        assert!(text.content.contains("Article 4"));
        assert_eq!(text.status, LegalTextStatus::Published);
    }

    #[test]
    fn test_blank_title_falls_back() {
        assert_eq!(synthesize_legal_text("x", Some("  ")).title, DEFAULT_TEXT_TITLE);
        assert_eq!(synthesize_news("x", None).title, DEFAULT_NEWS_TITLE);
    }

    #[test]
    fn test_synthesized_procedure_steps_are_ordered() {
        let procedure = synthesize_procedure("p", None);
        let orders: Vec<u32> = procedure.ordered_steps().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(!procedure.steps[2].is_required);
    }
}
