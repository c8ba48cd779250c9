//! In-process command bus.
//!
//! Handlers are keyed by command name and run synchronously, in subscription order,
//! each isolated from the failures of its siblings.

pub mod command;
pub mod payload;

pub use command::{names, Command, CATALOG};

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{debug, error, trace, warn};

use crate::error::Result;

/// A subscribed command handler
pub type Handler = dyn Fn(&Command) -> Result<()>;

/// Identifies one subscription for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    handler: Rc<Handler>,
    once: bool,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    by_name: HashMap<String, Vec<Subscriber>>,
}

impl Registry {
    fn insert(&mut self, name: &str, handler: Rc<Handler>, once: bool) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push(Subscriber { id, handler, once });
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        for subscribers in self.by_name.values_mut() {
            if let Some(pos) = subscribers.iter().position(|s| s.id == id) {
                subscribers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Look up a live subscriber, detaching it first when it is one-shot.
    fn claim(&mut self, name: &str, id: SubscriptionId) -> Option<Rc<Handler>> {
        let subscribers = self.by_name.get_mut(name)?;
        let pos = subscribers.iter().position(|s| s.id == id)?;
        if subscribers[pos].once {
            Some(subscribers.remove(pos).handler)
        } else {
            Some(Rc::clone(&subscribers[pos].handler))
        }
    }
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that ran to completion
    pub delivered: usize,
    /// Handlers that returned an error or panicked
    pub failed: usize,
}

impl DispatchReport {
    pub fn is_unhandled(&self) -> bool {
        self.delivered == 0 && self.failed == 0
    }
}

/// Cheaply clonable handle to one shared registry.
#[derive(Clone, Default)]
pub struct CommandBus {
    registry: Rc<RefCell<Registry>>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `name`, after any existing handlers.
    pub fn subscribe<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Command) -> Result<()> + 'static,
    {
        let id = self.registry.borrow_mut().insert(name, Rc::new(handler), false);
        trace!(command = %name, ?id, "Subscribed");
        id
    }

    /// Register a handler that is removed before its first invocation.
    pub fn subscribe_once<F>(&self, name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Command) -> Result<()> + 'static,
    {
        let id = self.registry.borrow_mut().insert(name, Rc::new(handler), true);
        trace!(command = %name, ?id, "Subscribed once");
        id
    }

    /// Like [`subscribe_once`](Self::subscribe_once), but the subscription also ends when
    /// the returned guard is dropped.
    pub fn subscribe_once_guarded<F>(&self, name: &str, handler: F) -> SubscriptionGuard
    where
        F: Fn(&Command) -> Result<()> + 'static,
    {
        let id = self.subscribe_once(name, handler);
        SubscriptionGuard {
            registry: Rc::downgrade(&self.registry),
            id,
        }
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.borrow_mut().remove(id)
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.registry
            .borrow()
            .by_name
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Deliver `command` to every handler subscribed when dispatch starts.
    ///
    /// Handlers subscribed during the dispatch are not called; handlers removed during
    /// the dispatch are skipped. Errors and panics are logged and counted, never propagated.
    pub fn dispatch(&self, command: Command) -> DispatchReport {
        let snapshot: Vec<SubscriptionId> = self
            .registry
            .borrow()
            .by_name
            .get(&command.name)
            .map(|subs| subs.iter().map(|s| s.id).collect())
            .unwrap_or_default();

        debug!(command = %command.name, handlers = snapshot.len(), "Dispatching");

        let mut report = DispatchReport::default();
        for id in snapshot {
            let Some(handler) = self.registry.borrow_mut().claim(&command.name, id) else {
                continue;
            };
            match catch_unwind(AssertUnwindSafe(|| handler(&command))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    warn!(command = %command.name, error = %e, "Handler failed");
                    report.failed += 1;
                }
                Err(_) => {
                    error!(command = %command.name, "Handler panicked");
                    report.failed += 1;
                }
            }
        }

        if report.is_unhandled() {
            debug!(command = %command.name, "No handlers for command");
        }
        report
    }

    /// Build and dispatch a command in one step.
    pub fn raise(&self, name: &str, payload: serde_json::Value) -> DispatchReport {
        self.dispatch(Command::new(name, payload))
    }
}

/// Ends a subscription when dropped.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard {
    registry: Weak<RefCell<Registry>>,
    id: SubscriptionId,
}

impl SubscriptionGuard {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.borrow_mut().remove(self.id) {
                trace!(id = ?self.id, "Subscription released by guard");
            }
        }
    }
}
