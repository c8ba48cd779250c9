//! Two-step delete: Requested, then Confirmed or Cancelled.
//!
//! The `confirm-delete` listener lives exactly as long as the confirmation dialog: it is
//! consumed by the confirm dispatch, or released by the guard when the dialog closes
//! any other way.

use std::rc::{Rc, Weak};

use tracing::{debug, info};

use super::Services;
use crate::bus::names::CONFIRM_DELETE;
use crate::bus::payload::ConfirmDelete;
use crate::entity::RecordKind;
use crate::error::Result;
use crate::notify::Notification;
use crate::presenter::{ActionKey, Choice, Dialog};

/// Where a delete request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    Cancelled,
}

fn confirm_dialog() -> Dialog {
    Dialog::new("Confirm deletion")
        .paragraph("Delete this item? This cannot be undone.")
        .action(ActionKey::Confirm, "Delete")
        .action(ActionKey::Cancel, "Cancel")
}

fn on_confirm(services: &Services, payload: ConfirmDelete) -> Result<()> {
    let removed = services.store_mut().delete(payload.kind, &payload.id);
    info!(kind = %payload.kind, id = %payload.id, removed, "Delete confirmed");
    services.notify(Notification::success(
        "Deleted",
        "The item was deleted successfully.",
    ));
    Ok(())
}

/// Ask for confirmation, then delete `id` through the `confirm-delete` protocol.
pub fn request(services: &Rc<Services>, kind: RecordKind, id: &str) -> Result<Outcome> {
    let weak: Weak<Services> = Rc::downgrade(services);
    let _listener = services
        .bus
        .subscribe_once_guarded(CONFIRM_DELETE, move |command| {
            let Some(services) = weak.upgrade() else {
                return Ok(());
            };
            on_confirm(&services, command.parse()?)
        });

    match services.present(confirm_dialog()) {
        Choice::Selected {
            action: ActionKey::Confirm,
            ..
        } => {
            services.dispatch(
                CONFIRM_DELETE,
                &ConfirmDelete {
                    kind,
                    id: id.to_string(),
                },
            )?;
            Ok(Outcome::Confirmed)
        }
        _ => {
            debug!(kind = %kind, id = %id, "Delete cancelled");
            Ok(Outcome::Cancelled)
        }
    }
}
