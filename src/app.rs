use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use color_eyre::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{error, info, warn};

use crate::components::reminder_form::{FormField, ReminderFormState};
use crate::config::Config;
use crate::errors::{StoreError, ValidationError};
use crate::notify::{DesktopNotifier, DueEvent, Notifier};
use crate::reminder::{JsonFile, Persistence, Reminder, ReminderId, ReminderStore, SharedStore};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
    ConfirmDelete,
    Tray,
}

/// Modal message queued for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    /// A due reminder whose desktop notification failed.
    Alert { title: String, message: String },
    Warning { title: String, message: String },
}

pub struct App {
    pub running: bool,
    pub input_mode: InputMode,
    pub selected: usize,
    pub reminders: Vec<Reminder>,
    pub form_state: Option<ReminderFormState>,
    pub pending_delete: Option<Reminder>,
    pub dialogs: VecDeque<Dialog>,
    pub status_message: Option<String>,
    pub show_help: bool,
    minimize_to_tray: bool,
    store: SharedStore,
    persistence: Box<dyn Persistence>,
    scheduler: Scheduler,
    due_events: UnboundedReceiver<DueEvent>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let file = JsonFile::new(config.data_path());
        info!(path = %file.path().display(), "using reminder file");
        Self::with_parts(
            Box::new(file),
            Arc::new(DesktopNotifier::new(config.notification_timeout_secs)),
            config.poll_interval(),
            config.minimize_to_tray,
        )
    }

    pub(crate) fn with_parts(
        persistence: Box<dyn Persistence>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
        minimize_to_tray: bool,
    ) -> Result<Self> {
        let mut dialogs = VecDeque::new();
        let loaded = match persistence.load() {
            Ok(reminders) => reminders,
            Err(err) => {
                warn!(%err, "could not load reminders, starting fresh");
                dialogs.push_back(Dialog::Warning {
                    title: "Load Error".to_string(),
                    message: format!("Could not read reminders ({err}). Starting fresh."),
                });
                Vec::new()
            }
        };
        let store = ReminderStore::from_reminders(loaded);
        info!(count = store.len(), pending = store.pending_count(), "reminders loaded");
        let store = SharedStore::new(store);
        let (tx, rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new(store.clone(), notifier, tx, poll_interval);
        scheduler.start()?;

        let mut app = Self {
            running: true,
            input_mode: InputMode::Normal,
            selected: 0,
            reminders: Vec::new(),
            form_state: None,
            pending_delete: None,
            dialogs,
            status_message: None,
            show_help: false,
            minimize_to_tray,
            store,
            persistence,
            scheduler,
            due_events: rx,
        };
        app.refresh();
        Ok(app)
    }

    /// Re-read the store into the display snapshot.
    pub fn refresh(&mut self) {
        self.reminders = self.store.list();
        if self.selected >= self.reminders.len() {
            self.selected = self.reminders.len().saturating_sub(1);
        }
    }

    pub fn selected_reminder(&self) -> Option<&Reminder> {
        self.reminders.get(self.selected)
    }

    pub fn pending_count(&self) -> usize {
        self.reminders.iter().filter(|r| !r.notified).count()
    }

    pub fn next_pending(&self) -> Option<&Reminder> {
        self.reminders.iter().find(|r| !r.notified)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.reminders.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_id(&mut self, id: ReminderId) {
        if let Some(index) = self.reminders.iter().position(|r| r.id == id) {
            self.selected = index;
        }
    }

    // ── form ──

    pub fn open_add_form(&mut self) {
        self.form_state = Some(ReminderFormState::new(Local::now()));
        self.input_mode = InputMode::Form;
    }

    pub fn open_edit_form(&mut self) {
        match self.selected_reminder() {
            Some(reminder) => {
                self.form_state = Some(ReminderFormState::for_edit(reminder));
                self.input_mode = InputMode::Form;
            }
            None => self.status_message = Some("Please select a reminder to edit.".to_string()),
        }
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn form_tab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.active_field = form.active_field.next();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.active_field = form.active_field.prev();
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(ref mut form) = self.form_state {
            form.input_char(c);
            form.error = None;
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.backspace();
            form.error = None;
        }
    }

    /// Add or edit from the open form. Validation problems keep the form
    /// open with the message inline and leave the store untouched.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form_state.as_mut() else {
            return;
        };
        let Some(due_at) = form.parsed_due_at() else {
            form.error = Some(ValidationError::BadDateTime.to_string());
            form.active_field = FormField::Date;
            return;
        };

        let now = Local::now();
        let result = match form.editing {
            None => self.store.lock().add(&form.text, due_at, now),
            Some(id) => self.store.lock().edit(id, &form.text, due_at, now),
        };

        match result {
            Ok(reminder) => {
                let verb = if form.editing.is_some() { "Updated" } else { "Added" };
                self.status_message = Some(format!("{} '{}'", verb, reminder.text));
                self.close_form();
                self.persist();
                self.refresh();
                self.select_id(reminder.id);
            }
            Err(StoreError::Validation(err)) => {
                form.error = Some(err.to_string());
            }
            Err(err @ StoreError::NotFound(_)) => {
                self.close_form();
                self.dialogs.push_back(Dialog::Warning {
                    title: "Error".to_string(),
                    message: err.to_string(),
                });
                self.refresh();
            }
        }
    }

    // ── delete ──

    pub fn request_delete(&mut self) {
        match self.selected_reminder() {
            Some(reminder) => {
                self.pending_delete = Some(reminder.clone());
                self.input_mode = InputMode::ConfirmDelete;
            }
            None => self.status_message = Some("Please select a reminder to delete.".to_string()),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn confirm_delete(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(reminder) = self.pending_delete.take() else {
            return;
        };

        let result = self.store.lock().delete(reminder.id);
        match result {
            Ok(()) => {
                self.status_message = Some(format!("Deleted '{}'", reminder.text));
                self.persist();
            }
            Err(err) => self.dialogs.push_back(Dialog::Warning {
                title: "Error".to_string(),
                message: err.to_string(),
            }),
        }
        self.refresh();
    }

    // ── scheduler & persistence ──

    /// Drain due-events from the scheduler. Undelivered ones become alert
    /// dialogs, which also bring the window back from the tray.
    pub fn poll_due_events(&mut self) {
        let mut fired = false;
        while let Ok(event) = self.due_events.try_recv() {
            fired = true;
            info!(id = %event.id, delivered = event.delivered, "due event received");
            self.status_message = Some(format!("Reminder due: {}", event.title));
            if !event.delivered {
                self.dialogs.push_back(Dialog::Alert {
                    title: event.title,
                    message: format!("{} (could not show desktop notification)", event.message),
                });
                if self.input_mode == InputMode::Tray {
                    self.show_window();
                }
            }
        }

        if fired {
            self.persist();
            self.refresh();
        }
    }

    /// Save the whole store. Failures are reported, never fatal.
    pub fn persist(&mut self) {
        let reminders = self.store.list();
        if let Err(err) = self.persistence.save(&reminders) {
            error!(%err, "saving reminders failed");
            self.dialogs.push_back(Dialog::Warning {
                title: "Save Error".to_string(),
                message: format!("Could not save reminders: {err}"),
            });
        }
    }

    pub fn active_dialog(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialogs.pop_front();
    }

    // ── window ──

    /// Minimize to the tray, or quit when there is no tray.
    pub fn close_window(&mut self) {
        if self.minimize_to_tray {
            info!("minimizing to tray");
            self.input_mode = InputMode::Tray;
        } else {
            self.quit();
        }
    }

    pub fn show_window(&mut self) {
        self.input_mode = InputMode::Normal;
        self.refresh();
    }

    /// Stop the scheduler, then save, so no due-event races the final write.
    pub fn quit(&mut self) {
        self.scheduler.stop();
        self.poll_due_events();
        self.persist();
        self.running = false;
        info!(scheduler = ?self.scheduler.state(), "quit");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Instant;

    use chrono::{Duration as ChronoDuration, Timelike};

    use super::*;
    use crate::errors::{NotificationError, PersistError};

    #[derive(Clone, Default)]
    struct MemoryFile {
        initial: Vec<Reminder>,
        saved: Arc<Mutex<Vec<Vec<Reminder>>>>,
        fail_load: bool,
        fail_save: bool,
    }

    impl MemoryFile {
        fn last_saved(&self) -> Option<Vec<Reminder>> {
            self.saved.lock().unwrap().last().cloned()
        }
    }

    impl Persistence for MemoryFile {
        fn load(&self) -> Result<Vec<Reminder>, PersistError> {
            if self.fail_load {
                return Err(std::io::Error::other("disk on fire").into());
            }
            Ok(self.initial.clone())
        }

        fn save(&self, reminders: &[Reminder]) -> Result<(), PersistError> {
            if self.fail_save {
                return Err(std::io::Error::other("read-only").into());
            }
            self.saved.lock().unwrap().push(reminders.to_vec());
            Ok(())
        }
    }

    struct Unavailable;

    impl Notifier for Unavailable {
        fn notify(&self, _title: &str, _message: &str) -> Result<(), NotificationError> {
            Err(NotificationError::Dispatch("no daemon".to_string()))
        }
    }

    fn app_with(file: MemoryFile, tray: bool) -> App {
        App::with_parts(
            Box::new(file),
            Arc::new(Unavailable),
            Duration::from_secs(3600),
            tray,
        )
        .unwrap()
    }

    fn fill_form(app: &mut App, text: &str, due: chrono::DateTime<Local>) {
        let form = app.form_state.as_mut().unwrap();
        form.text = text.to_string();
        form.date = due.format("%Y-%m-%d").to_string();
        form.time = due.format("%H:%M").to_string();
    }

    #[test]
    fn adding_through_the_form_saves_and_selects() {
        let file = MemoryFile::default();
        let mut app = app_with(file.clone(), true);

        app.open_add_form();
        assert_eq!(app.input_mode, InputMode::Form);
        fill_form(&mut app, "water plants", Local::now() + ChronoDuration::hours(2));
        app.submit_form();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.reminders.len(), 1);
        assert_eq!(app.selected_reminder().unwrap().text, "water plants");
        assert_eq!(file.last_saved().unwrap().len(), 1);
    }

    #[test]
    fn invalid_form_stays_open_without_touching_the_store() {
        let file = MemoryFile::default();
        let mut app = app_with(file.clone(), true);

        app.open_add_form();
        fill_form(&mut app, "   ", Local::now() + ChronoDuration::hours(1));
        app.submit_form();
        assert_eq!(app.input_mode, InputMode::Form);
        assert_eq!(
            app.form_state.as_ref().unwrap().error.as_deref(),
            Some("Reminder text cannot be empty.")
        );

        fill_form(&mut app, "past", Local::now() - ChronoDuration::hours(1));
        app.submit_form();
        assert_eq!(
            app.form_state.as_ref().unwrap().error.as_deref(),
            Some("Please select a future date and time.")
        );

        app.form_state.as_mut().unwrap().time = "noon".to_string();
        app.submit_form();
        assert!(app.form_state.as_ref().unwrap().error.is_some());

        assert!(app.reminders.is_empty());
        assert!(file.last_saved().is_none());
    }

    #[test]
    fn edit_and_delete_round_trip() {
        let file = MemoryFile::default();
        let mut app = app_with(file.clone(), true);
        app.open_add_form();
        fill_form(&mut app, "draft", Local::now() + ChronoDuration::hours(1));
        app.submit_form();

        app.open_edit_form();
        assert!(app.form_state.as_ref().unwrap().editing.is_some());
        app.form_state.as_mut().unwrap().text = "final".to_string();
        app.submit_form();
        assert_eq!(app.reminders[0].text, "final");

        app.request_delete();
        assert_eq!(app.input_mode, InputMode::ConfirmDelete);
        app.cancel_delete();
        assert_eq!(app.reminders.len(), 1);

        app.request_delete();
        app.confirm_delete();
        assert!(app.reminders.is_empty());
        assert_eq!(file.last_saved().unwrap().len(), 0);
    }

    #[test]
    fn text_only_edit_keeps_the_exact_due_time() {
        let now = Local::now();
        let precise = (now + ChronoDuration::hours(2))
            .with_second(45)
            .unwrap()
            .with_nanosecond(123_456_000)
            .unwrap();
        let soon = now + ChronoDuration::seconds(1);
        let file = MemoryFile {
            initial: vec![
                Reminder {
                    id: ReminderId(1),
                    text: "this minute".to_string(),
                    due_at: soon,
                    notified: false,
                },
                Reminder {
                    id: ReminderId(2),
                    text: "legacy".to_string(),
                    due_at: precise,
                    notified: false,
                },
            ],
            ..Default::default()
        };
        let mut app = app_with(file.clone(), true);

        for (index, text) in [(0, "this minute, edited"), (1, "legacy, edited")] {
            app.selected = index;
            app.open_edit_form();
            app.form_state.as_mut().unwrap().text = text.to_string();
            app.submit_form();
            assert_eq!(app.input_mode, InputMode::Normal, "{text}");
        }

        let saved = file.last_saved().unwrap();
        assert_eq!(saved[0].text, "this minute, edited");
        assert_eq!(saved[0].due_at, soon);
        assert_eq!(saved[1].text, "legacy, edited");
        assert_eq!(saved[1].due_at, precise);
    }

    #[test]
    fn actions_without_selection_only_set_status() {
        let mut app = app_with(MemoryFile::default(), true);
        app.open_edit_form();
        app.request_delete();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Please select a reminder to delete.")
        );
    }

    #[test]
    fn save_failure_becomes_a_warning_dialog() {
        let file = MemoryFile {
            fail_save: true,
            ..Default::default()
        };
        let mut app = app_with(file, true);
        app.open_add_form();
        fill_form(&mut app, "kept in memory", Local::now() + ChronoDuration::hours(1));
        app.submit_form();

        assert_eq!(app.reminders.len(), 1);
        assert!(matches!(
            app.active_dialog(),
            Some(Dialog::Warning { title, .. }) if title == "Save Error"
        ));
        app.dismiss_dialog();
        assert!(app.active_dialog().is_none());
    }

    #[test]
    fn load_failure_starts_empty_with_warning() {
        let file = MemoryFile {
            fail_load: true,
            ..Default::default()
        };
        let app = app_with(file, true);
        assert!(app.reminders.is_empty());
        assert!(matches!(
            app.active_dialog(),
            Some(Dialog::Warning { title, .. }) if title == "Load Error"
        ));
    }

    #[test]
    fn failed_notification_shows_alert_and_leaves_tray() {
        let file = MemoryFile {
            initial: vec![Reminder {
                id: ReminderId(1),
                text: "stand up".to_string(),
                due_at: Local::now() - ChronoDuration::seconds(1),
                notified: false,
            }],
            ..Default::default()
        };
        let mut app = app_with(file.clone(), true);
        app.close_window();
        assert_eq!(app.input_mode, InputMode::Tray);

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.dialogs.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            app.poll_due_events();
        }

        assert!(matches!(
            app.active_dialog(),
            Some(Dialog::Alert { title, .. }) if title == "stand up"
        ));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.reminders[0].notified);
        assert!(file.last_saved().unwrap()[0].notified);
    }

    #[test]
    fn closing_without_tray_quits_and_saves() {
        let file = MemoryFile::default();
        let mut app = app_with(file.clone(), false);
        app.close_window();
        assert!(!app.running);
        assert!(file.last_saved().is_some());
    }
}
