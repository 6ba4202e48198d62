use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::reminder::Reminder;
use crate::theme;

pub struct ReminderList;

impl ReminderList {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        reminders: &[Reminder],
        selected_index: usize,
        now: DateTime<Local>,
    ) {
        let t = theme::current();
        let w = area.width as usize;
        let pending = reminders.iter().filter(|r| !r.notified).count();

        let title = if w >= 40 {
            format!(" Active Reminders ({} pending) ", pending)
        } else {
            " Reminders ".to_string()
        };

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        if reminders.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No reminders. Press 'a' to add one.").style(t.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let items: Vec<ListItem> = reminders
            .iter()
            .enumerate()
            .map(|(i, reminder)| {
                let (suffix, style) = if reminder.notified {
                    (" (Notified)", t.notified)
                } else if reminder.is_past_due(now) {
                    (" (Past Due)", t.due)
                } else {
                    ("", Style::default())
                };

                let when = format!(" @ {}", reminder.time_display());
                let text_w = inner_w.saturating_sub(when.len() + suffix.len() + 1);
                let line = format!(" {}{}{}", truncate(&reminder.text, text_w), when, suffix);

                let style = if i == selected_index { t.selected } else { style };
                ListItem::new(Line::from(Span::styled(line, style)))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{}...", kept)
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer reminder", 8), "a lon...");
        assert_eq!(truncate("übung", 2), "üb");
    }
}
