//! Process wiring: config, store, bus and workflows, built once per `App`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info};

use crate::bus::{command, Command, CommandBus, DispatchReport};
use crate::config::Config;
use crate::error::{LexdeskError, Result};
use crate::files::FileGateway;
use crate::notify::{Notifier, TimerQueue};
use crate::presenter::{ModalPresenter, Surface};
use crate::store::{CatalogStore, SqliteSnapshots, DEFAULT_USER};
use crate::workflow::{self, Services};

/// The outer collaborators an `App` talks to
pub struct AppParts {
    pub surface: Box<dyn Surface>,
    pub notifier: Rc<dyn Notifier>,
    pub files: Rc<dyn FileGateway>,
}

/// A running catalog with its command bus and installed workflows
pub struct App {
    services: Rc<Services>,
}

impl App {
    /// Open the catalog persisted under `config.data_dir`.
    pub fn open(config: Config, parts: AppParts) -> Result<Self> {
        let storage = SqliteSnapshots::open(&config.data_dir)?;
        let mut store =
            CatalogStore::open(Box::new(storage))?.with_validation(config.strict_validation);

        match &config.acting_user {
            Some(user) if store.current_user() != user => {
                info!(user = %user, "Switching current user");
                store.set_current_user(user.clone());
            }
            Some(_) => {}
            None if store.current_user() == DEFAULT_USER
                && config.current_user != DEFAULT_USER =>
            {
                info!(user = %config.current_user, "Recording current user");
                store.set_current_user(config.current_user.clone());
            }
            None => {}
        }

        Ok(Self::with_store(config, store, parts))
    }

    /// Build an app around an existing store. Workflows are installed exactly once here.
    pub fn with_store(config: Config, store: CatalogStore, parts: AppParts) -> Self {
        let bus = CommandBus::new();
        let services = Rc::new(Services {
            timers: TimerQueue::new(Rc::clone(&parts.notifier)),
            config,
            store: Rc::new(RefCell::new(store)),
            bus,
            presenter: RefCell::new(ModalPresenter::new(parts.surface)),
            notifier: parts.notifier,
            files: parts.files,
        });
        workflow::install(&services);
        debug!("App ready");
        Self { services }
    }

    pub fn bus(&self) -> &CommandBus {
        &self.services.bus
    }

    pub fn store(&self) -> Ref<'_, CatalogStore> {
        self.services.store()
    }

    pub fn store_mut(&self) -> RefMut<'_, CatalogStore> {
        self.services.store_mut()
    }

    pub fn config(&self) -> &Config {
        &self.services.config
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.services.timers
    }

    pub fn services(&self) -> &Rc<Services> {
        &self.services
    }

    /// Raise a catalog command. Names outside the catalog are rejected before dispatch.
    pub fn dispatch(&self, name: &str, payload: Value) -> Result<DispatchReport> {
        if !command::is_known(name) {
            return Err(LexdeskError::UnknownCommand(name.to_string()));
        }
        Ok(self.services.bus.dispatch(Command::new(name, payload)))
    }

    /// Wait for every deferred notification to fire.
    pub fn finish(&self) -> usize {
        self.services.timers.run_until_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFiles;
    use crate::notify::NotificationLog;
    use crate::presenter::ScriptedSurface;
    use serde_json::json;
    use tempfile::TempDir;

    fn parts() -> AppParts {
        AppParts {
            surface: Box::new(ScriptedSurface::new([])),
            notifier: Rc::new(NotificationLog::new()),
            files: Rc::new(MemoryFiles::new()),
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let app = App::with_store(Config::default(), CatalogStore::in_memory(), parts());
        match app.dispatch("navigate-to-section", json!({})) {
            Err(LexdeskError::UnknownCommand(name)) => assert_eq!(name, "navigate-to-section"),
            other => panic!("expected unknown command, got {:?}", other.map(|r| r.delivered)),
        }
    }

    #[test]
    fn test_every_catalog_command_has_a_listener() {
        let app = App::with_store(Config::default(), CatalogStore::in_memory(), parts());
        for (name, _) in command::CATALOG {
            assert!(app.bus().subscriber_count(name) >= 1, "{} has no listener", name);
        }
    }

    #[test]
    fn test_acting_user_replaces_persisted_user() {
        let dir = TempDir::new().unwrap();
        let acting = |user: &str| Config {
            data_dir: dir.path().to_path_buf(),
            acting_user: Some(user.to_string()),
            ..Config::default()
        };
        {
            let app = App::open(acting("alice"), parts()).unwrap();
            assert_eq!(app.store().current_user(), "alice");
        }
        {
            let app = App::open(acting("bob"), parts()).unwrap();
            assert_eq!(app.store().current_user(), "bob");
        }
        let plain = Config {
            data_dir: dir.path().to_path_buf(),
            current_user: "carol".to_string(),
            ..Config::default()
        };
        let app = App::open(plain, parts()).unwrap();
        assert_eq!(app.store().current_user(), "bob");
    }

    #[test]
    fn test_open_records_configured_user_once() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            current_user: "avocat".to_string(),
            ..Config::default()
        };
        {
            let app = App::open(config.clone(), parts()).unwrap();
            assert_eq!(app.store().current_user(), "avocat");
        }
        let later = Config {
            current_user: "greffier".to_string(),
            ..config
        };
        let app = App::open(later, parts()).unwrap();
        assert_eq!(app.store().current_user(), "avocat");
    }
}
