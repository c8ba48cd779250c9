use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use super::{
    changed, changed_text, confirm, input_value, on, placeholder, report_invalid,
    report_unchanged, Services,
};
use crate::bus::names;
use crate::bus::payload::{FavoriteRequest, Prefill, ProcedureRef, ResourceRequest};
use crate::entity::{
    split_list, Difficulty, ItemType, NewProcedure, Procedure, ProcedurePatch, ProcedureStep,
    RecordKind,
};
use crate::error::{Result, ValidationError};
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog, FormField, FormInput};

const STEP_SEPARATOR: char = ';';

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::VIEW_PROCEDURE, view);
    on(services, names::ADD_PROCEDURE, add);
    on(services, names::EDIT_PROCEDURE, edit);
    on(services, names::DELETE_PROCEDURE, delete);
}

fn procedure_dialog(procedure: &Procedure) -> Dialog {
    let mut dialog = Dialog::new("Administrative procedure")
        .heading(&procedure.title)
        .paragraph(&procedure.description)
        .fact("Difficulty", procedure.difficulty.to_string())
        .fact("Duration", &procedure.estimated_time)
        .fact("Status", procedure.status.to_string())
        .heading("Steps");

    if procedure.steps.is_empty() {
        dialog = dialog.paragraph("No steps defined");
    }
    for (index, step) in procedure.ordered_steps().into_iter().enumerate() {
        let mut line = format!("Step {}: {}", index + 1, step.title);
        if !step.description.is_empty() {
            line.push_str(&format!(" - {}", step.description));
        }
        if let Some(documents) = step.documents.as_ref().filter(|d| !d.is_empty()) {
            line.push_str(&format!(" (documents: {})", documents.join(", ")));
        }
        dialog = dialog.item(line);
    }

    dialog = dialog.heading("Required documents");
    if procedure.required_documents.is_empty() {
        dialog = dialog.item("No specific document required");
    }
    for document in &procedure.required_documents {
        dialog = dialog.item(document);
    }

    dialog
        .action(ActionKey::AddToFavorites, "Add to favorites")
        .action(ActionKey::DownloadGuide, "Download guide")
        .action(ActionKey::Close, "Close")
}

fn view(services: &Rc<Services>, payload: ProcedureRef) -> Result<()> {
    let stored = services.store().get_procedure(&payload.procedure_id).cloned();
    let procedure = stored.unwrap_or_else(|| {
        debug!(id = %payload.procedure_id, "Procedure not found, synthesizing");
        placeholder::synthesize_procedure(&payload.procedure_id, payload.title.as_deref())
    });

    match services.present(procedure_dialog(&procedure)).action() {
        Some(ActionKey::AddToFavorites) => {
            services.dispatch(
                names::ADD_TO_FAVORITES,
                &FavoriteRequest {
                    item_type: ItemType::Procedure,
                    item_id: Some(procedure.base.id.clone()),
                    item_name: Some(procedure.title.clone()),
                },
            )?;
        }
        Some(ActionKey::DownloadGuide) => {
            services.dispatch(
                names::DOWNLOAD_RESOURCE,
                &ResourceRequest {
                    resource_name: procedure.title.clone(),
                    resource_type: "procedure".to_string(),
                },
            )?;
        }
        _ => {}
    }
    Ok(())
}

fn step_titles(steps: &[ProcedureStep]) -> String {
    let separator = format!("{} ", STEP_SEPARATOR);
    steps
        .iter()
        .map(|s| s.title.as_str())
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Rebuild steps from the form's title list, keeping details of steps whose title survives.
///
/// Each existing step is kept at most once. New steps get ids no kept step uses.
fn steps_from_titles(raw: &str, existing: &[ProcedureStep]) -> Vec<ProcedureStep> {
    let mut unmatched: Vec<&ProcedureStep> = existing.iter().collect();
    let mut steps: Vec<ProcedureStep> = raw
        .split(STEP_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(index, title)| {
            let order = index as u32 + 1;
            match unmatched.iter().position(|s| s.title == title) {
                Some(at) => ProcedureStep {
                    order,
                    ..unmatched.remove(at).clone()
                },
                None => ProcedureStep {
                    id: String::new(),
                    ..ProcedureStep::new(order, title, "")
                },
            }
        })
        .collect();

    let mut taken: HashSet<String> = steps
        .iter()
        .filter(|s| !s.id.is_empty())
        .map(|s| s.id.clone())
        .collect();
    let mut next = 1u32;
    for step in steps.iter_mut().filter(|s| s.id.is_empty()) {
        while taken.contains(&next.to_string()) {
            next += 1;
        }
        step.id = next.to_string();
        taken.insert(step.id.clone());
    }
    steps
}

fn procedure_form(title: &str, seed: &NewProcedure, submit: &str) -> Dialog {
    Dialog::new(title)
        .field(FormField::new("title", "Title", &seed.title))
        .field(FormField::new("description", "Description", &seed.description))
        .field(FormField::new("category", "Category", &seed.category))
        .field(FormField::new(
            "difficulty",
            "Difficulty (easy, medium, hard)",
            seed.difficulty.to_string(),
        ))
        .field(FormField::new("estimatedTime", "Estimated time", &seed.estimated_time))
        .field(FormField::new(
            "requiredDocuments",
            "Required documents (comma separated)",
            seed.required_documents.join(", "),
        ))
        .field(FormField::new(
            "steps",
            "Steps (separated by ';')",
            step_titles(&seed.steps),
        ))
        .action(ActionKey::Submit, submit)
        .action(ActionKey::Cancel, "Cancel")
}

fn parse_difficulty(input: &FormInput) -> std::result::Result<Difficulty, ValidationError> {
    match input_value(input, "difficulty") {
        raw if raw.is_empty() => Ok(Difficulty::default()),
        raw => raw
            .parse()
            .map_err(|e: String| ValidationError::new("difficulty", e)),
    }
}

fn add(services: &Rc<Services>, payload: Prefill<NewProcedure>) -> Result<()> {
    let seed = payload.data.unwrap_or_default();
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(procedure_form("New procedure", &seed, "Create"))
    else {
        return Ok(());
    };

    let difficulty = match parse_difficulty(&input) {
        Ok(d) => d,
        Err(e) => {
            report_invalid(services, "procedure", &e);
            return Ok(());
        }
    };
    let draft = NewProcedure {
        title: input_value(&input, "title"),
        description: input_value(&input, "description"),
        steps: steps_from_titles(&input_value(&input, "steps"), &seed.steps),
        category: input_value(&input, "category"),
        difficulty,
        estimated_time: input_value(&input, "estimatedTime"),
        required_documents: split_list(&input_value(&input, "requiredDocuments")),
        status: seed.status,
    };

    let added = services.store_mut().add_procedure(draft);
    match added {
        Ok(procedure) => services.notify(Notification::success(
            "Procedure created",
            format!("\"{}\" was created.", procedure.title),
        )),
        Err(e) => report_invalid(services, "procedure", &e),
    }
    Ok(())
}

fn edit(services: &Rc<Services>, payload: ProcedureRef) -> Result<()> {
    let Some(procedure) = services.store().get_procedure(&payload.procedure_id).cloned() else {
        debug!(id = %payload.procedure_id, "Nothing to edit");
        return Ok(());
    };
    let seed = NewProcedure {
        title: procedure.title.clone(),
        description: procedure.description.clone(),
        steps: procedure.steps.clone(),
        category: procedure.category.clone(),
        difficulty: procedure.difficulty,
        estimated_time: procedure.estimated_time.clone(),
        required_documents: procedure.required_documents.clone(),
        status: procedure.status,
    };
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(procedure_form("Edit procedure", &seed, "Save"))
    else {
        return Ok(());
    };

    let difficulty = match parse_difficulty(&input) {
        Ok(d) => d,
        Err(e) => {
            report_invalid(services, "procedure", &e);
            return Ok(());
        }
    };
    let raw_steps = input_value(&input, "steps");
    let steps = if raw_steps == step_titles(&procedure.steps) {
        None
    } else {
        Some(steps_from_titles(&raw_steps, &procedure.steps))
    };
    let patch = ProcedurePatch {
        title: changed_text(&input, "title", &procedure.title),
        description: changed_text(&input, "description", &procedure.description),
        steps,
        category: changed_text(&input, "category", &procedure.category),
        difficulty: changed(difficulty, &procedure.difficulty),
        estimated_time: changed_text(&input, "estimatedTime", &procedure.estimated_time),
        required_documents: changed(
            split_list(&input_value(&input, "requiredDocuments")),
            &procedure.required_documents,
        ),
        status: None,
    };
    if patch == ProcedurePatch::default() {
        report_unchanged(services, "procedure");
        return Ok(());
    }

    let updated = services
        .store_mut()
        .update_procedure(&procedure.base.id, patch);
    match updated {
        Ok(true) => services.notify(Notification::success(
            "Procedure updated",
            "The procedure was updated.",
        )),
        Ok(false) => debug!(id = %procedure.base.id, "Procedure vanished before saving"),
        Err(e) => report_invalid(services, "procedure", &e),
    }
    Ok(())
}

fn delete(services: &Rc<Services>, payload: ProcedureRef) -> Result<()> {
    confirm::request(services, RecordKind::Procedure, &payload.procedure_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_from_titles_keeps_known_steps() {
        let mut existing = ProcedureStep::new(1, "Form", "Fill in the form");
        existing.documents = Some(vec!["ID".to_string()]);
        let steps = steps_from_titles("Payment; Form ;", &[existing]);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].title, "Payment");
        assert_eq!(steps[0].order, 1);
        assert_eq!(steps[1].description, "Fill in the form");
        assert_eq!(steps[1].order, 2);
        assert_eq!(steps[1].documents, Some(vec!["ID".to_string()]));
    }

    #[test]
    fn test_repeated_titles_do_not_share_a_step() {
        let existing = vec![
            ProcedureStep::new(1, "Visit", "First visit"),
            ProcedureStep::new(2, "Payment", ""),
        ];
        let steps = steps_from_titles("Visit; Payment; Visit", &existing);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].description, "First visit");
        assert_eq!(steps[2].description, "");
        let ids: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(steps[0].id, "1");
        assert_eq!(steps[1].id, "2");
        assert_eq!(steps[2].id, "3");
    }

    #[test]
    fn test_step_titles_round_trip_through_form() {
        let steps = vec![ProcedureStep::new(1, "A", ""), ProcedureStep::new(2, "B", "")];
        assert_eq!(step_titles(&steps), "A; B");
    }
}
