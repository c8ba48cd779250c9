//! Command handlers: one module per workflow family.
//!
//! Handlers reach the store, presenter and bus through [`Services`] at call time and
//! never hold a store borrow across a dialog or a nested dispatch.

mod audit;
mod confirm;
mod data;
mod favorites;
mod legal_text;
mod news;
mod placeholder;
mod procedure;
mod review;
mod search;
mod templates;

pub use placeholder::{synthesize_legal_text, synthesize_news, synthesize_procedure};

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::bus::{Command, CommandBus, DispatchReport};
use crate::config::Config;
use crate::error::Result;
use crate::files::FileGateway;
use crate::notify::{Notification, Notifier, TimerQueue};
use crate::presenter::{Choice, Dialog, FormInput, ModalPresenter};
use crate::store::CatalogStore;

/// Everything a handler may touch
pub struct Services {
    pub config: Config,
    pub store: Rc<RefCell<CatalogStore>>,
    pub bus: CommandBus,
    pub presenter: RefCell<ModalPresenter>,
    pub notifier: Rc<dyn Notifier>,
    pub timers: TimerQueue,
    pub files: Rc<dyn FileGateway>,
}

impl Services {
    pub fn store(&self) -> Ref<'_, CatalogStore> {
        self.store.borrow()
    }

    pub fn store_mut(&self) -> RefMut<'_, CatalogStore> {
        self.store.borrow_mut()
    }

    pub fn present(&self, dialog: Dialog) -> Choice {
        self.presenter.borrow_mut().present(dialog)
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Raise a follow-up command with a typed payload.
    pub fn dispatch<T: Serialize>(&self, name: &str, payload: &T) -> Result<DispatchReport> {
        Ok(self.bus.dispatch(Command::with(name, payload)?))
    }

    /// Save a file and run the started/completed notification pair.
    pub fn deliver_download(&self, file_name: &str, content: &str) -> Result<()> {
        self.files.save_file(file_name, content)?;
        self.notify(Notification::info(
            "Download started",
            format!("Downloading \"{}\"...", file_name),
        ));
        self.timers.schedule(
            self.config.download_delay(),
            Notification::success(
                "Download completed",
                format!("\"{}\" downloaded successfully.", file_name),
            ),
        );
        Ok(())
    }

    pub fn current_user(&self) -> String {
        self.store().current_user().to_string()
    }
}

/// Subscribe `handler` to `name`, decoding the payload into `P`.
///
/// The closure holds the services weakly so the bus does not keep them alive.
fn on<P, F>(services: &Rc<Services>, name: &'static str, handler: F)
where
    P: DeserializeOwned + 'static,
    F: Fn(&Rc<Services>, P) -> Result<()> + 'static,
{
    let weak: Weak<Services> = Rc::downgrade(services);
    services.bus.subscribe(name, move |command| {
        let Some(services) = weak.upgrade() else {
            debug!(command = %name, "Services gone, ignoring command");
            return Ok(());
        };
        let payload: P = command.parse()?;
        handler(&services, payload)
    });
}

/// Trimmed form value, empty when absent.
fn input_value(input: &FormInput, name: &str) -> String {
    input.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
}

/// The trimmed form value, `None` when it matches `current` once trimmed.
fn changed_text(input: &FormInput, name: &str, current: &str) -> Option<String> {
    let value = input_value(input, name);
    (value != current.trim()).then_some(value)
}

/// `new`, or `None` when it equals `current`.
fn changed<T: PartialEq>(new: T, current: &T) -> Option<T> {
    (new != *current).then_some(new)
}

/// Tell the user an edit form came back without changes.
fn report_unchanged(services: &Services, what: &str) {
    debug!(record = %what, "Edit saved without changes");
    services.notify(Notification::info(
        "No changes",
        format!("The {} was left as it was.", what),
    ));
}

/// Log a rejected record and tell the user.
fn report_invalid(services: &Services, what: &str, error: &crate::error::ValidationError) {
    warn!(record = %what, field = %error.field, "Record rejected");
    services.notify(Notification::error(
        format!("Invalid {}", what),
        error.to_string(),
    ));
}

/// Register every workflow on the services' bus. Call once per bus.
pub fn install(services: &Rc<Services>) {
    legal_text::install(services);
    procedure::install(services);
    news::install(services);
    search::install(services);
    favorites::install(services);
    templates::install(services);
    data::install(services);
    review::install(services);
    audit::install(&services.bus);
    debug!("Workflows installed");
}
