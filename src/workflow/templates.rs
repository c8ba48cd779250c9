use std::rc::Rc;

use tracing::debug;

use super::{
    changed, changed_text, confirm, input_value, on, report_invalid, report_unchanged, Services,
};
use crate::bus::names;
use crate::bus::payload::{Prefill, TemplateRef};
use crate::entity::{NewTemplate, RecordKind, TemplatePatch};
use crate::error::Result;
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog, FormField};

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::CREATE_TEMPLATE, create);
    on(services, names::USE_TEMPLATE, use_template);
    on(services, names::EDIT_TEMPLATE, edit);
    on(services, names::DELETE_TEMPLATE, delete);
}

fn template_form(title: &str, seed: &NewTemplate, submit: &str) -> Dialog {
    Dialog::new(title)
        .field(FormField::new("name", "Name", &seed.name))
        .field(FormField::new("category", "Category", &seed.category))
        .field(FormField::new(
            "public",
            "Public (yes/no)",
            if seed.is_public { "yes" } else { "no" },
        ))
        .field(FormField::new(
            "content",
            "Content ({{variable}} placeholders)",
            &seed.content,
        ))
        .action(ActionKey::Submit, submit)
        .action(ActionKey::Cancel, "Cancel")
}

fn is_public(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "yes" | "y" | "true" | "1")
}

fn create(services: &Rc<Services>, payload: Prefill<NewTemplate>) -> Result<()> {
    let seed = payload.data.unwrap_or_default();
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(template_form("New template", &seed, "Create"))
    else {
        return Ok(());
    };

    let draft = NewTemplate {
        name: input_value(&input, "name"),
        content: input_value(&input, "content"),
        category: input_value(&input, "category"),
        variables: Vec::new(),
        is_public: is_public(&input_value(&input, "public")),
        created_by: services.current_user(),
    };

    let added = services.store_mut().add_template(draft);
    match added {
        Ok(template) => services.notify(Notification::success(
            "Template created",
            format!(
                "\"{}\" was created with {} variable(s).",
                template.name,
                template.variables.len()
            ),
        )),
        Err(e) => report_invalid(services, "template", &e),
    }
    Ok(())
}

/// Count a use, collect the variables and deliver the filled document.
fn use_template(services: &Rc<Services>, payload: TemplateRef) -> Result<()> {
    let used = services.store_mut().use_template(&payload.template_id);
    let Some(template) = used else {
        debug!(id = %payload.template_id, "Unknown template");
        return Ok(());
    };

    let mut dialog = Dialog::new(format!("Use template: {}", template.name))
        .fact("Category", &template.category)
        .fact("Used", format!("{} time(s)", template.usage_count));
    if template.variables.is_empty() {
        dialog = dialog.paragraph("This template has no variables.");
    }
    for variable in &template.variables {
        dialog = dialog.field(FormField::new(variable, variable, ""));
    }
    let dialog = dialog
        .action(ActionKey::Submit, "Generate document")
        .action(ActionKey::Cancel, "Cancel");

    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(dialog)
    else {
        return Ok(());
    };

    let values = input
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect();
    let document = template.render(&values);
    services.files.save_file(&format!("{}.txt", template.name), &document)?;
    services.notify(Notification::success(
        "Document generated",
        format!("\"{}\" was filled in and saved.", template.name),
    ));
    Ok(())
}

fn edit(services: &Rc<Services>, payload: TemplateRef) -> Result<()> {
    let Some(template) = services.store().get_template(&payload.template_id).cloned() else {
        debug!(id = %payload.template_id, "Nothing to edit");
        return Ok(());
    };
    let seed = NewTemplate {
        name: template.name.clone(),
        content: template.content.clone(),
        category: template.category.clone(),
        variables: template.variables.clone(),
        is_public: template.is_public,
        created_by: template.created_by.clone(),
    };
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(template_form("Edit template", &seed, "Save"))
    else {
        return Ok(());
    };

    let patch = TemplatePatch {
        name: changed_text(&input, "name", &template.name),
        content: changed_text(&input, "content", &template.content),
        category: changed_text(&input, "category", &template.category),
        variables: None,
        is_public: changed(is_public(&input_value(&input, "public")), &template.is_public),
    };
    if patch == TemplatePatch::default() {
        report_unchanged(services, "template");
        return Ok(());
    }

    let updated = services.store_mut().update_template(&template.base.id, patch);
    match updated {
        Ok(true) => services.notify(Notification::success(
            "Template updated",
            "The template was updated.",
        )),
        Ok(false) => debug!(id = %template.base.id, "Template vanished before saving"),
        Err(e) => report_invalid(services, "template", &e),
    }
    Ok(())
}

fn delete(services: &Rc<Services>, payload: TemplateRef) -> Result<()> {
    confirm::request(services, RecordKind::Template, &payload.template_id)?;
    Ok(())
}
