//! Document review outcomes. Review state is not stored, only announced.

use std::rc::Rc;

use tracing::info;

use super::{input_value, on, Services};
use crate::bus::names;
use crate::bus::payload::DocumentRef;
use crate::error::Result;
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog, FormField};

pub(super) fn install(services: &Rc<Services>) {
    on(services, names::APPROVE_DOCUMENT, approve);
    on(services, names::REJECT_DOCUMENT, reject);
    on(services, names::REQUEST_CHANGES_DOCUMENT, request_changes);
}

fn approve(services: &Rc<Services>, payload: DocumentRef) -> Result<()> {
    info!(document = %payload.document_id, "Document approved");
    services.notify(Notification::success(
        "Document approved",
        format!("\"{}\" was approved.", payload.document_title),
    ));
    Ok(())
}

/// Ask for a reason. `None` when the dialog was dismissed or cancelled.
fn ask_reason(services: &Services, title: String, submit: &str) -> Option<String> {
    let dialog = Dialog::new(title)
        .field(FormField::new("reason", "Reason", ""))
        .action(ActionKey::Submit, submit)
        .action(ActionKey::Cancel, "Cancel");
    match services.present(dialog) {
        Choice::Selected {
            action: ActionKey::Submit,
            input,
        } => Some(input_value(&input, "reason")),
        _ => None,
    }
}

fn reject(services: &Rc<Services>, payload: DocumentRef) -> Result<()> {
    let title = format!("Reject \"{}\"", payload.document_title);
    let Some(reason) = ask_reason(services, title, "Reject") else {
        return Ok(());
    };
    info!(document = %payload.document_id, reason = %reason, "Document rejected");
    services.notify(Notification::error(
        "Document rejected",
        format!("\"{}\" was rejected: {}", payload.document_title, reason),
    ));
    Ok(())
}

fn request_changes(services: &Rc<Services>, payload: DocumentRef) -> Result<()> {
    let title = format!("Request changes to \"{}\"", payload.document_title);
    let Some(reason) = ask_reason(services, title, "Send") else {
        return Ok(());
    };
    info!(document = %payload.document_id, reason = %reason, "Changes requested");
    services.notify(Notification::info(
        "Changes requested",
        format!("Changes were requested on \"{}\": {}", payload.document_title, reason),
    ));
    Ok(())
}
