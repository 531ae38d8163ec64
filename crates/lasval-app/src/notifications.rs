//! Transient user notifications
//!
//! Each notification expires after a fixed timeout or when dismissed.
//! Expiry is driven by `Message::Tick`, so the center itself never spawns
//! timers and stays deterministic under test.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use lasval_core::NotificationKind;

/// Default display time of a notification
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Local>,
    pub expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct NotificationCenter {
    next_id: u64,
    active: Vec<Notification>,
    timeout: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl NotificationCenter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            next_id: 0,
            active: Vec::new(),
            timeout,
        }
    }

    /// Show a notification; it is removed again after the timeout.
    pub fn show(&mut self, kind: NotificationKind, message: impl Into<String>) -> NotificationId {
        self.show_at(kind, message, Instant::now())
    }

    pub fn show_at(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        let message = message.into();
        tracing::debug!("Notification {:?} ({}): {}", id, kind, message);

        self.active.push(Notification {
            id,
            kind,
            message,
            created_at: Local::now(),
            expires_at: now + self.timeout,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(NotificationKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(NotificationKind::Error, message)
    }

    /// Remove a notification early. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// Drop every notification whose timeout has passed; returns how many.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|n| !n.is_expired(now));
        before - self.active.len()
    }

    /// Visible notifications, oldest first
    pub fn active(&self) -> &[Notification] {
        &self.active
    }

    /// Notifications shown after `id`
    pub fn since(&self, id: NotificationId) -> impl Iterator<Item = &Notification> {
        self.active.iter().filter(move |n| n.id > id)
    }

    pub fn last_id(&self) -> NotificationId {
        NotificationId(self.next_id)
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.active.last()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_expire_after_timeout() {
        let mut center = NotificationCenter::new(Duration::from_millis(5000));
        let start = Instant::now();
        center.show_at(NotificationKind::Success, "done", start);

        assert_eq!(center.expire(start + Duration::from_millis(4999)), 0);
        assert_eq!(center.active().len(), 1);

        assert_eq!(center.expire(start + Duration::from_millis(5000)), 1);
        assert!(center.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut center = NotificationCenter::default();
        let first = center.error("first");
        let second = center.success("second");

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        assert_eq!(center.active().len(), 1);
        assert_eq!(center.active()[0].id, second);
    }

    #[test]
    fn test_since_only_returns_newer() {
        let mut center = NotificationCenter::default();
        center.error("old");
        let mark = center.last_id();
        center.success("new");

        let newer: Vec<_> = center.since(mark).map(|n| n.message.as_str()).collect();
        assert_eq!(newer, vec!["new"]);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut center = NotificationCenter::default();
        let a = center.error("a");
        let b = center.error("a");
        assert!(b > a);
        assert_eq!(center.latest().map(|n| n.id), Some(b));
    }
}
