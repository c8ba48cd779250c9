use std::rc::Rc;

use chrono::Utc;
use tracing::debug;

use super::{
    changed, changed_text, confirm, input_value, on, placeholder, report_invalid,
    report_unchanged, Services,
};
use crate::bus::names;
use crate::bus::payload::{DownloadLegalText, FavoriteRequest, LegalTextRef, Prefill};
use crate::entity::{
    split_list, ItemType, LegalText, LegalTextPatch, LegalTextStatus, LegalTextType,
    NewLegalText, RecordKind,
};
use crate::error::{Result, ValidationError};
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog, FormField, FormInput};

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::VIEW_LEGAL_TEXT, view);
    on(services, names::DOWNLOAD_LEGAL_TEXT, download);
    on(services, names::SHARE_LEGAL_TEXT, share);
    on(services, names::ADD_LEGAL_TEXT, add);
    on(services, names::EDIT_LEGAL_TEXT, edit);
    on(services, names::DELETE_LEGAL_TEXT, delete);
}

/// The stored text, or a synthesized one carrying `title`.
fn resolve(services: &Services, id: &str, title: Option<&str>) -> LegalText {
    match services.store().get_legal_text(id) {
        Some(text) => text.clone(),
        None => {
            debug!(id = %id, "Legal text not found, synthesizing");
            placeholder::synthesize_legal_text(id, title)
        }
    }
}

fn document_dialog(text: &LegalText) -> Dialog {
    Dialog::new("Document viewer")
        .heading(&text.title)
        .fact("Type", text.text_type.to_string())
        .fact("Status", text.status.to_string())
        .fact("Category", &text.category)
        .fact("Author", &text.author)
        .paragraph(&text.content)
        .action(ActionKey::Download, "Download PDF")
        .action(ActionKey::Share, "Share")
        .action(ActionKey::AddToFavorites, "Add to favorites")
        .action(ActionKey::Close, "Close")
}

fn view(services: &Rc<Services>, payload: LegalTextRef) -> Result<()> {
    let text = resolve(services, &payload.text_id, payload.title.as_deref());

    match services.present(document_dialog(&text)).action() {
        Some(ActionKey::Download) => {
            services.dispatch(
                names::DOWNLOAD_LEGAL_TEXT,
                &DownloadLegalText {
                    text_id: text.base.id.clone(),
                    title: Some(text.title.clone()),
                    format: Some("PDF".to_string()),
                },
            )?;
        }
        Some(ActionKey::Share) => {
            services.dispatch(
                names::SHARE_LEGAL_TEXT,
                &LegalTextRef {
                    text_id: text.base.id.clone(),
                    title: Some(text.title.clone()),
                },
            )?;
        }
        Some(ActionKey::AddToFavorites) => {
            services.dispatch(
                names::ADD_TO_FAVORITES,
                &FavoriteRequest {
                    item_type: ItemType::LegalText,
                    item_id: Some(text.base.id.clone()),
                    item_name: Some(text.title.clone()),
                },
            )?;
        }
        _ => {}
    }
    Ok(())
}

/// Text of a downloaded document
fn download_body(title: &str, content: &str) -> String {
    format!(
        "{}\n\n{}\n\n---\nGenerated on {}\n",
        title,
        content,
        Utc::now().format("%Y-%m-%d")
    )
}

fn download(services: &Rc<Services>, payload: DownloadLegalText) -> Result<()> {
    let text = resolve(services, &payload.text_id, payload.title.as_deref());
    let format = payload.format.as_deref().unwrap_or("PDF").to_lowercase();
    let file_name = format!("{}.{}", text.title, format);
    services.deliver_download(&file_name, &download_body(&text.title, &text.content))
}

fn share(services: &Rc<Services>, payload: LegalTextRef) -> Result<()> {
    let link = services.config.share_link(&payload.text_id);
    let title = payload.title.unwrap_or_else(|| "Document".to_string());
    let dialog = Dialog::new(format!("Share: {}", title))
        .paragraph("Share link")
        .fact("Link", &link)
        .action(ActionKey::CopyLink, "Copy link")
        .action(ActionKey::Close, "Close");

    if let Some(ActionKey::CopyLink) = services.present(dialog).action() {
        debug!(link = %link, "Share link copied");
        services.notify(Notification::success(
            "Link copied",
            "The share link was copied to the clipboard.",
        ));
    }
    Ok(())
}

fn text_form(title: &str, seed: &NewLegalText, submit: &str) -> Dialog {
    Dialog::new(title)
        .field(FormField::new("title", "Title", &seed.title))
        .field(FormField::new("type", "Type (law, decree, regulation, circular)", seed.text_type.to_string()))
        .field(FormField::new("category", "Category", &seed.category))
        .field(FormField::new("tags", "Tags (comma separated)", seed.tags.join(", ")))
        .field(FormField::new("content", "Content", &seed.content))
        .action(ActionKey::Submit, submit)
        .action(ActionKey::Cancel, "Cancel")
}

fn parse_type(input: &FormInput) -> std::result::Result<LegalTextType, ValidationError> {
    match input_value(input, "type") {
        raw if raw.is_empty() => Ok(LegalTextType::default()),
        raw => raw
            .parse()
            .map_err(|e: String| ValidationError::new("type", e)),
    }
}

fn add(services: &Rc<Services>, payload: Prefill<NewLegalText>) -> Result<()> {
    let seed = payload.data.unwrap_or_default();
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(text_form("New legal text", &seed, "Create"))
    else {
        return Ok(());
    };

    let text_type = match parse_type(&input) {
        Ok(t) => t,
        Err(e) => {
            report_invalid(services, "legal text", &e);
            return Ok(());
        }
    };
    let draft = NewLegalText {
        title: input_value(&input, "title"),
        content: input_value(&input, "content"),
        text_type,
        status: LegalTextStatus::Draft,
        category: input_value(&input, "category"),
        author: services.current_user(),
        tags: split_list(&input_value(&input, "tags")),
        metadata: seed.metadata,
    };

    let added = services.store_mut().add_legal_text(draft);
    match added {
        Ok(text) => services.notify(Notification::success(
            "Text created",
            format!("\"{}\" was created.", text.title),
        )),
        Err(e) => report_invalid(services, "legal text", &e),
    }
    Ok(())
}

fn edit(services: &Rc<Services>, payload: LegalTextRef) -> Result<()> {
    let Some(text) = services.store().get_legal_text(&payload.text_id).cloned() else {
        debug!(id = %payload.text_id, "Nothing to edit");
        return Ok(());
    };
    let seed = NewLegalText {
        title: text.title.clone(),
        content: text.content.clone(),
        text_type: text.text_type,
        category: text.category.clone(),
        tags: text.tags.clone(),
        ..Default::default()
    };
    let Choice::Selected {
        action: ActionKey::Submit,
        input,
    } = services.present(text_form("Edit legal text", &seed, "Save"))
    else {
        return Ok(());
    };

    let text_type = match parse_type(&input) {
        Ok(t) => t,
        Err(e) => {
            report_invalid(services, "legal text", &e);
            return Ok(());
        }
    };
    let patch = LegalTextPatch {
        title: changed_text(&input, "title", &text.title),
        content: changed_text(&input, "content", &text.content),
        text_type: changed(text_type, &text.text_type),
        category: changed_text(&input, "category", &text.category),
        tags: changed(split_list(&input_value(&input, "tags")), &text.tags),
        ..Default::default()
    };
    if patch == LegalTextPatch::default() {
        report_unchanged(services, "legal text");
        return Ok(());
    }

    let updated = services.store_mut().update_legal_text(&text.base.id, patch);
    match updated {
        Ok(true) => services.notify(Notification::success(
            "Text updated",
            "The legal text was updated.",
        )),
        Ok(false) => debug!(id = %text.base.id, "Legal text vanished before saving"),
        Err(e) => report_invalid(services, "legal text", &e),
    }
    Ok(())
}

fn delete(services: &Rc<Services>, payload: LegalTextRef) -> Result<()> {
    confirm::request(services, RecordKind::LegalText, &payload.text_id)?;
    Ok(())
}
