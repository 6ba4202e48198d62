mod app;
mod components;
mod config;
mod errors;
mod event;
mod logging;
mod notify;
mod reminder;
mod scheduler;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode};
use chrono::Local;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout};
use tracing::{info, warn};

use config::Config;

/// Upper bound on how long a due alert waits before it is drawn.
const TICK: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    color_eyre::install()?;

    let (config, config_problem) = Config::load();
    if let Some(dir) = config.log_dir() {
        if let Err(err) = logging::init(&config.log_level, &dir) {
            eprintln!("Logging disabled: {err}");
        }
    }
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }
    theme::init(&config.theme);
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut app = App::new(&config)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    if app.running {
        app.quit();
    }
    tui::restore()?;
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.poll_due_events();
        terminal.draw(|frame| render(frame, app))?;

        if let Some(key) = event::next_key_event(TICK)? {
            handle_key(app, key.code, key.modifiers);
        }
    }
    Ok(())
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if app.input_mode == InputMode::Tray {
        components::Tray::render(frame, area, app.pending_count(), app.next_pending());
        return;
    }

    let [list_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    components::ReminderList::render(frame, list_area, &app.reminders, app.selected, Local::now());
    components::StatusBar::render(frame, status_area, app.input_mode, app.status_message.as_deref());

    if let Some(ref form) = app.form_state {
        components::ReminderForm::render(frame, area, form);
    }
    if let Some(ref reminder) = app.pending_delete {
        components::dialog::render_confirm_delete(frame, area, reminder);
    }
    if app.show_help {
        components::help::render_help(frame, area);
    }
    if let Some(dialog) = app.active_dialog() {
        components::dialog::render_dialog(frame, area, dialog, app.dialogs.len());
    }
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // Dialogs take priority
    if app.active_dialog().is_some() {
        if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_dialog();
        }
        return;
    }

    if app.show_help {
        if code == KeyCode::Esc || code == KeyCode::Char('?') {
            app.show_help = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => {
            app.status_message = None;
            handle_normal_input(app, code);
        }
        InputMode::Form => handle_form_input(app, code),
        InputMode::ConfirmDelete => match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        },
        InputMode::Tray => match code {
            KeyCode::Char('s') | KeyCode::Enter => app.show_window(),
            KeyCode::Char('q') => app.quit(),
            _ => {}
        },
    }
}

fn handle_normal_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.close_window(),
        KeyCode::Char('a') | KeyCode::Char('n') => app.open_add_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}
