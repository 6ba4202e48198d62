use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::Dialog;
use crate::reminder::Reminder;
use crate::theme;

fn popup_area(area: Rect, max_w: u16, max_h: u16) -> Rect {
    let popup_w = area.width.min(max_w).max(30u16.min(area.width));
    let popup_h = area.height.min(max_h).max(7u16.min(area.height));
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    Rect::new(x, y, popup_w, popup_h)
}

/// Modal message box: due-reminder fallback alerts and warnings.
pub fn render_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog, queued: usize) {
    let t = theme::current();
    let (title, message, color) = match dialog {
        Dialog::Alert { title, message } => (title.as_str(), message.as_str(), Color::Yellow),
        Dialog::Warning { title, message } => (title.as_str(), message.as_str(), Color::Red),
    };

    let popup = popup_area(area, 60, 10);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let mut footer = vec![
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(":OK", t.dim),
    ];
    if queued > 1 {
        footer.push(Span::styled(format!("  ({} more)", queued - 1), t.dim));
    }

    let lines = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(footer),
    ];

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(para, popup);
}

pub fn render_confirm_delete(frame: &mut Frame, area: Rect, reminder: &Reminder) {
    let t = theme::current();
    let popup = popup_area(area, 56, 8);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Confirm Delete ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let key_style = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(format!("Are you sure you want to delete '{}'?", reminder.text)),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", key_style),
            Span::styled(":Yes  ", t.dim),
            Span::styled("n", key_style),
            Span::styled("/", t.dim),
            Span::styled("Esc", key_style),
            Span::styled(":No", t.dim),
        ]),
    ];

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(para, popup);
}
