use std::fmt;

use chrono::{DateTime, Local};

/// Opaque reminder identifier, derived from the creation timestamp in
/// milliseconds and bumped when two reminders land in the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderId(pub u64);

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ReminderId,
    pub text: String,
    pub due_at: DateTime<Local>,
    pub notified: bool,
}

impl Reminder {
    pub fn is_past_due(&self, now: DateTime<Local>) -> bool {
        self.due_at <= now
    }

    /// Due and not yet fired.
    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        !self.notified && self.is_past_due(now)
    }

    pub fn time_display(&self) -> String {
        self.due_at.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Body of the desktop notification for this reminder.
    pub fn due_message(&self) -> String {
        format!("Reminder set for {}", self.due_at.format("%H:%M"))
    }
}
