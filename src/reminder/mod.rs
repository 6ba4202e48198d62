pub mod model;
pub mod persist;
pub mod store;

pub use model::{Reminder, ReminderId};
pub use persist::{JsonFile, Persistence};
pub use store::{ReminderStore, SharedStore};
