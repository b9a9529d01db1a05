use log::debug;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

pub const CREATE_NOTICE_TTL: Duration = Duration::from_millis(3000);
pub const DELETE_NOTICE_TTL: Duration = Duration::from_millis(5000);
pub const LOAD_NOTICE_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NoticeKind::Success => write!(f, "[ok] {}", self.text),
            NoticeKind::Error => write!(f, "[error] {}", self.text),
        }
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    current: Option<Notification>,
}

/// Single transient message slot. Showing a message replaces the previous one
/// and restarts the expiry clock.
#[derive(Default)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    expiry: Option<JoinHandle<()>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&mut self, notification: Notification, ttl: Duration) {
        if let Some(previous) = self.expiry.take() {
            previous.abort();
        }

        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.current = Some(notification);
            slot.generation
        };

        let slot = Arc::clone(&self.slot);
        self.expiry = Some(tokio::spawn(async move {
            sleep(ttl).await;
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            // An aborted timer can still get here if it was already running
            if slot.generation == generation {
                debug!("Notification expired after {}ms", ttl.as_millis());
                slot.current = None;
            }
        }));
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if let Some(expiry) = self.expiry.take() {
            expiry.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notification_expires_after_delay() {
        let mut notifier = Notifier::new();
        notifier.show(Notification::success("Added Crane"), CREATE_NOTICE_TTL);

        sleep(Duration::from_millis(2999)).await;
        assert_eq!(notifier.current(), Some(Notification::success("Added Crane")));

        sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(notifier.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notification_replaces_old_and_restarts_clock() {
        let mut notifier = Notifier::new();
        notifier.show(Notification::success("Deleted Heron"), DELETE_NOTICE_TTL);

        sleep(Duration::from_millis(4000)).await;
        notifier.show(Notification::error("name is required"), CREATE_NOTICE_TTL);
        assert_eq!(
            notifier.current(),
            Some(Notification::error("name is required"))
        );

        // The first message's deadline passes without touching the second
        sleep(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;
        assert_eq!(
            notifier.current().map(|n| n.text),
            Some("name is required".to_string())
        );

        sleep(Duration::from_millis(1600)).await;
        tokio::task::yield_now().await;
        assert_eq!(notifier.current(), None);
    }

    #[test]
    fn test_banner_format() {
        assert_eq!(Notification::success("Added Crane").to_string(), "[ok] Added Crane");
        assert_eq!(Notification::error("gone").to_string(), "[error] gone");
    }
}
