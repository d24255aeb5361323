//! Transient UI effects: toast notifications and navigation.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Fire-and-forget sink for controller side effects
pub trait UiSink: Send + Sync {
    fn notify(&self, notification: Notification);
    fn navigate(&self, route: &str);
}

/// Keeps every effect so callers can hand them back to the client
#[derive(Debug, Default)]
pub struct CollectingSink {
    effects: Mutex<Effects>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Effects {
    pub notifications: Vec<Notification>,
    pub navigations: Vec<String>,
}

impl Effects {
    /// Last navigation target, if any
    pub fn redirect(&self) -> Option<&str> {
        self.navigations.last().map(String::as_str)
    }
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Effects> {
        // A panic elsewhere must not lose the recorded effects
        self.effects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Effects {
        self.lock().clone()
    }

    pub fn take(&self) -> Effects {
        std::mem::take(&mut *self.lock())
    }
}

impl UiSink for CollectingSink {
    fn notify(&self, notification: Notification) {
        self.lock().notifications.push(notification);
    }

    fn navigate(&self, route: &str) {
        self.lock().navigations.push(route.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_drains_on_take() {
        let sink = CollectingSink::new();
        sink.notify(Notification::success("Cage updated."));
        sink.navigate("/staff/manage-cage");

        let effects = sink.take();
        assert_eq!(effects.notifications.len(), 1);
        assert_eq!(effects.redirect(), Some("/staff/manage-cage"));
        assert_eq!(sink.snapshot(), Effects::default());
    }
}
