use notify_rust::{Notification, Timeout};

use crate::errors::NotificationError;
use crate::reminder::ReminderId;

pub const APP_NAME: &str = "Reminder";

/// Something that can put a due reminder in front of the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError>;
}

/// OS notification service via notify-rust.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    timeout_ms: u32,
}

impl DesktopNotifier {
    pub fn new(timeout_secs: u32) -> Self {
        Self {
            timeout_ms: timeout_secs.saturating_mul(1000),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) -> Result<(), NotificationError> {
        Notification::new()
            .summary(title)
            .body(message)
            .appname(APP_NAME)
            .icon("alarm-clock")
            .timeout(Timeout::Milliseconds(self.timeout_ms))
            .show()
            .map(|_| ())
            .map_err(|err| NotificationError::Dispatch(err.to_string()))
    }
}

/// A reminder that fired, as reported back to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub struct DueEvent {
    pub id: ReminderId,
    pub title: String,
    pub message: String,
    /// False when the desktop notification could not be shown; the UI must
    /// then show its own dialog.
    pub delivered: bool,
}
