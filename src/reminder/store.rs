use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use super::model::{Reminder, ReminderId};
use crate::errors::{StoreError, ValidationError};

/// In-memory reminder collection, always sorted ascending by `due_at`.
///
/// The store knows nothing about persistence or scheduling; callers decide
/// when to save after a mutation.
#[derive(Debug, Default)]
pub struct ReminderStore {
    reminders: Vec<Reminder>,
    last_id: u64,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded records. Duplicate ids are replaced with
    /// fresh ones so that ids stay unique.
    pub fn from_reminders(mut reminders: Vec<Reminder>) -> Self {
        let mut store = Self {
            last_id: reminders.iter().map(|r| r.id.0).max().unwrap_or(0),
            reminders: Vec::with_capacity(reminders.len()),
        };

        let mut seen = HashSet::new();
        for reminder in reminders.iter_mut() {
            if !seen.insert(reminder.id) {
                let fresh = store.bump_id(0);
                warn!(old = %reminder.id, new = %fresh, "duplicate reminder id reassigned");
                reminder.id = fresh;
                seen.insert(fresh);
            }
        }

        store.reminders = reminders;
        store.sort();
        store
    }

    pub fn add(
        &mut self,
        text: &str,
        due_at: DateTime<Local>,
        now: DateTime<Local>,
    ) -> Result<Reminder, StoreError> {
        let text = validate(text, due_at, now)?;
        let reminder = Reminder {
            id: self.bump_id(now.timestamp_millis().max(0) as u64),
            text,
            due_at,
            notified: false,
        };
        self.reminders.push(reminder.clone());
        self.sort();
        debug!(id = %reminder.id, "reminder added");
        Ok(reminder)
    }

    pub fn edit(
        &mut self,
        id: ReminderId,
        text: &str,
        due_at: DateTime<Local>,
        now: DateTime<Local>,
    ) -> Result<Reminder, StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        let text = validate(text, due_at, now)?;

        let reminder = &mut self.reminders[index];
        let was_fired = reminder.notified || reminder.due_at <= now;
        reminder.text = text;
        reminder.due_at = due_at;
        if due_at > now && was_fired {
            debug!(id = %id, "notified flag reset by edit");
            reminder.notified = false;
        }

        let edited = reminder.clone();
        self.sort();
        Ok(edited)
    }

    pub fn delete(&mut self, id: ReminderId) -> Result<(), StoreError> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        self.reminders.remove(index);
        debug!(id = %id, "reminder deleted");
        Ok(())
    }

    pub fn list(&self) -> Vec<Reminder> {
        self.reminders.clone()
    }

    #[cfg(test)]
    pub fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    /// Idempotent; unknown ids are ignored.
    pub fn mark_notified(&mut self, id: ReminderId) {
        if let Some(reminder) = self.reminders.iter_mut().find(|r| r.id == id) {
            reminder.notified = true;
        }
    }

    /// Mark every reminder due at `now` as notified and return them.
    pub fn claim_due(&mut self, now: DateTime<Local>) -> Vec<Reminder> {
        let due: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect();
        for reminder in &due {
            self.mark_notified(reminder.id);
        }
        due
    }

    pub fn pending_count(&self) -> usize {
        self.reminders.iter().filter(|r| !r.notified).count()
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    fn position(&self, id: ReminderId) -> Option<usize> {
        self.reminders.iter().position(|r| r.id == id)
    }

    fn bump_id(&mut self, candidate: u64) -> ReminderId {
        self.last_id = candidate.max(self.last_id + 1);
        ReminderId(self.last_id)
    }

    fn sort(&mut self) {
        self.reminders.sort_by_key(|r| r.due_at);
    }
}

fn validate(
    text: &str,
    due_at: DateTime<Local>,
    now: DateTime<Local>,
) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if due_at <= now {
        return Err(ValidationError::NotInFuture);
    }
    Ok(text.to_string())
}

/// Lock-guarded handle shared by the UI and the scheduler thread.
///
/// Hold the guard only for the structural operation; never across a
/// notification dispatch or a file write.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<ReminderStore>>,
}

impl SharedStore {
    pub fn new(store: ReminderStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, ReminderStore> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("reminder store mutex poisoned; recovering inner state");
                poisoned.into_inner()
            }
        }
    }

    pub fn list(&self) -> Vec<Reminder> {
        self.lock().list()
    }
}
