use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::reminder::Reminder;
use crate::theme;

/// Minimized view shown while the window is "closed" to the tray. The
/// scheduler keeps running underneath.
pub struct Tray;

impl Tray {
    pub fn render(frame: &mut Frame, area: Rect, pending: usize, next: Option<&Reminder>) {
        let t = theme::current();
        let [_, bar, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(4),
            Constraint::Fill(1),
        ])
        .areas(area);

        let block = Block::default()
            .title(" Reminder ")
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        let summary = match next {
            Some(r) => format!(
                "Running in the system tray. {} pending, next: {} @ {}",
                pending,
                r.text,
                r.time_display()
            ),
            None => format!("Running in the system tray. {} pending", pending),
        };

        let key_style = Style::default().add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(Span::styled(summary, t.dim)),
            Line::from(vec![
                Span::styled("s", key_style),
                Span::styled(":Show Reminders  ", t.dim),
                Span::styled("q", key_style),
                Span::styled(":Quit", t.dim),
            ]),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), bar);
    }
}
