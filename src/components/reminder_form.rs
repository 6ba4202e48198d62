use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::reminder::{Reminder, ReminderId};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Text,
    Date,
    Time,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Text => FormField::Date,
            FormField::Date => FormField::Time,
            FormField::Time => FormField::Text,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Text => FormField::Time,
            FormField::Date => FormField::Text,
            FormField::Time => FormField::Date,
        }
    }
}

/// Add/edit form. `editing` is set when the form edits an existing reminder.
#[derive(Debug, Clone)]
pub struct ReminderFormState {
    pub text: String,
    pub date: String,
    pub time: String,
    pub active_field: FormField,
    pub editing: Option<ReminderId>,
    pub error: Option<String>,
    /// Exact due time of the reminder being edited. Kept while the date and
    /// time fields still show it, since they only hold minutes.
    original_due: Option<DateTime<Local>>,
}

impl ReminderFormState {
    /// Blank form defaulting to one minute from `now`.
    pub fn new(now: DateTime<Local>) -> Self {
        let due = now + chrono::Duration::seconds(60);
        Self {
            text: String::new(),
            date: due.format("%Y-%m-%d").to_string(),
            time: due.format("%H:%M").to_string(),
            active_field: FormField::Text,
            editing: None,
            error: None,
            original_due: None,
        }
    }

    pub fn for_edit(reminder: &Reminder) -> Self {
        Self {
            text: reminder.text.clone(),
            date: reminder.due_at.format("%Y-%m-%d").to_string(),
            time: reminder.due_at.format("%H:%M").to_string(),
            active_field: FormField::Text,
            editing: Some(reminder.id),
            error: None,
            original_due: Some(reminder.due_at),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            " Edit Reminder "
        } else {
            " New Reminder "
        }
    }

    pub fn parsed_due_at(&self) -> Option<DateTime<Local>> {
        if let Some(original) = self.original_due {
            if self.date.trim() == original.format("%Y-%m-%d").to_string()
                && self.time.trim() == original.format("%H:%M").to_string()
            {
                return Some(original);
            }
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M").ok()?;
        Local.from_local_datetime(&date.and_time(time)).earliest()
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Text => self.text.push(c),
            FormField::Date => self.date.push(c),
            FormField::Time => self.time.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Text => {
                self.text.pop();
            }
            FormField::Date => {
                self.date.pop();
            }
            FormField::Time => {
                self.time.pop();
            }
        }
    }
}

pub struct ReminderForm;

impl ReminderForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &ReminderFormState) {
        let t = theme::current();

        let form_w = area.width.min(56).max(30);
        let form_h = area.height.min(11).max(9);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(state.title())
            .title_style(t.accent)
            .borders(Borders::ALL)
            .border_style(t.accent);

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // text
            Constraint::Length(1), // date
            Constraint::Length(1), // time
            Constraint::Length(1), // spacer
            Constraint::Length(2), // error
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        render_field(frame, rows[0], "Text:", &state.text, state.active_field == FormField::Text);
        render_field(frame, rows[1], "Date:", &state.date, state.active_field == FormField::Date);
        render_field(frame, rows[2], "Time:", &state.time, state.active_field == FormField::Time);

        if let Some(ref err) = state.error {
            let msg = Paragraph::new(err.as_str())
                .style(t.due)
                .wrap(Wrap { trim: true });
            frame.render_widget(msg, rows[4]);
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", t.dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", t.dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", t.dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[5]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let t = theme::current();
    let cursor = if active { "_" } else { "" };
    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let line = Line::from(vec![
        Span::styled(format!("{:<7}", label), t.dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
