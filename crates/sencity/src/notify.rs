//! User-facing notifications raised by the dispatcher.
use std::cell::RefCell;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Failure,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.kind == NotificationKind::Failure
    }
}

/// Sink for notifications. Hosts show them as alerts or toasts.
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Failure => {
                warn!(title = %notification.title, "{}", notification.message);
            }
            NotificationKind::Info => {
                info!(title = %notification.title, "{}", notification.message);
            }
        }
    }
}

/// Keeps every notification in order for later inspection.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: RefCell<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }

    /// Drains everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        self.received.take()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.borrow().last().cloned()
    }

    pub fn failures(&self) -> Vec<Notification> {
        self.received
            .borrow()
            .iter()
            .filter(|n| n.is_failure())
            .cloned()
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: &Notification) {
        self.received.borrow_mut().push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier_keeps_order() {
        let notifier = CollectingNotifier::new();
        notifier.notify(&Notification::info("Place saved", "서울역"));
        notifier.notify(&Notification::failure("Search failed", "timeout"));

        assert_eq!(notifier.notifications().len(), 2);
        assert_eq!(notifier.failures().len(), 1);
        assert_eq!(notifier.last().map(|n| n.title), Some("Search failed".to_string()));

        let drained = notifier.take();
        assert_eq!(drained[0].kind, NotificationKind::Info);
        assert!(notifier.notifications().is_empty());
    }
}
