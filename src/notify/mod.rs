//! User-visible notifications and the deferred-notification timer queue.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Success => write!(f, "success"),
            Level::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub level: Level,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: Level::Info,
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            ..Self::info(title, description)
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            ..Self::info(title, description)
        }
    }
}

/// Delivers notifications to the user
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to stderr, one line each.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        info!(level = %notification.level, title = %notification.title, "Notification");
        eprintln!("[{}] {}", notification.title, notification.description);
    }
}

/// Keeps every notification in memory. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct NotificationLog {
    entries: Rc<RefCell<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.entries.borrow().iter().map(|n| n.title.clone()).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.entries.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries.borrow_mut().push(notification);
    }
}

struct Timer {
    due: Instant,
    notification: Notification,
}

/// Deferred notifications. Nothing cancels a scheduled entry: each one fires exactly once.
#[derive(Clone)]
pub struct TimerQueue {
    notifier: Rc<dyn Notifier>,
    timers: Rc<RefCell<Vec<Timer>>>,
}

impl TimerQueue {
    pub fn new(notifier: Rc<dyn Notifier>) -> Self {
        Self {
            notifier,
            timers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn schedule(&self, delay: Duration, notification: Notification) {
        debug!(title = %notification.title, delay_ms = delay.as_millis() as u64, "Notification scheduled");
        self.timers.borrow_mut().push(Timer {
            due: Instant::now() + delay,
            notification,
        });
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Fire every entry due at `now`, in due order. Returns how many fired.
    pub fn fire_due(&self, now: Instant) -> usize {
        let mut due: Vec<Timer> = {
            let mut timers = self.timers.borrow_mut();
            let (ready, waiting): (Vec<Timer>, Vec<Timer>) =
                timers.drain(..).partition(|t| t.due <= now);
            *timers = waiting;
            ready
        };
        due.sort_by_key(|t| t.due);
        let fired = due.len();
        for timer in due {
            self.notifier.notify(timer.notification);
        }
        fired
    }

    /// Fire everything now, ignoring due times.
    pub fn fire_all(&self) -> usize {
        let mut fired = 0;
        while self.pending() > 0 {
            let latest = self
                .timers
                .borrow()
                .iter()
                .map(|t| t.due)
                .max()
                .unwrap_or_else(Instant::now);
            fired += self.fire_due(latest);
        }
        fired
    }

    /// Sleep until each entry is due and fire it. Returns when the queue is empty.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        loop {
            let next = self.timers.borrow().iter().map(|t| t.due).min();
            let Some(next) = next else {
                return fired;
            };
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            }
            fired += self.fire_due(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_records_in_order() {
        let log = NotificationLog::new();
        log.notify(Notification::info("a", ""));
        log.notify(Notification::error("b", "bad"));
        assert_eq!(log.titles(), vec!["a", "b"]);
        assert_eq!(log.last().map(|n| n.level), Some(Level::Error));
    }

    #[test]
    fn test_timer_fires_only_when_due() {
        let log = NotificationLog::new();
        let timers = TimerQueue::new(Rc::new(log.clone()));
        timers.schedule(Duration::from_secs(60), Notification::success("done", ""));

        assert_eq!(timers.fire_due(Instant::now()), 0);
        assert!(log.is_empty());

        assert_eq!(timers.fire_due(Instant::now() + Duration::from_secs(61)), 1);
        assert_eq!(log.titles(), vec!["done"]);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_run_until_idle_drains_queue() {
        let log = NotificationLog::new();
        let timers = TimerQueue::new(Rc::new(log.clone()));
        timers.schedule(Duration::from_millis(5), Notification::info("second", ""));
        timers.schedule(Duration::ZERO, Notification::info("first", ""));

        assert_eq!(timers.run_until_idle(), 2);
        assert_eq!(log.titles(), vec!["first", "second"]);
    }

    #[test]
    fn test_fire_all_ignores_due_times() {
        let log = NotificationLog::new();
        let timers = TimerQueue::new(Rc::new(log.clone()));
        timers.schedule(Duration::from_secs(3600), Notification::info("late", ""));
        assert_eq!(timers.fire_all(), 1);
        assert_eq!(log.len(), 1);
    }
}
