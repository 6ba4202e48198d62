use thiserror::Error;

use crate::reminder::ReminderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Reminder text cannot be empty.")]
    EmptyText,
    #[error("Please select a future date and time.")]
    NotInFuture,
    #[error("Date must be YYYY-MM-DD and time HH:MM.")]
    BadDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Reminder {0} no longer exists.")]
    NotFound(ReminderId),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO_FAILURE: {0}")]
    Io(#[from] std::io::Error),
    #[error("BAD_JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("NOTIFY_FAILED: {0}")]
    Dispatch(String),
}
