use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Wait up to `timeout` for a key press. Releases, repeats, mouse and
/// resize events yield `None` so the caller redraws and checks for due
/// reminders at least once per timeout.
pub fn next_key_event(timeout: Duration) -> color_eyre::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}
