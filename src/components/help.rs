use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme;

pub fn render_help(frame: &mut Frame, area: Rect) {
    let t = theme::current();

    let popup_w = area.width.min(48).max(30);
    let popup_h = area.height.min(17).max(10);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(t.accent)
        .borders(Borders::ALL)
        .border_style(t.accent);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let row = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), key_style),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Reminders", section_style)),
        row("j/k", "Move selection"),
        row("a / n", "Add reminder"),
        row("e / Enter", "Edit selected"),
        row("d / Del", "Delete selected"),
        Line::from(""),
        Line::from(Span::styled("Form", section_style)),
        row("Tab", "Next field"),
        row("Enter", "Save"),
        row("Esc", "Cancel"),
        Line::from(""),
        Line::from(Span::styled("Window", section_style)),
        row("Esc", "Close to tray"),
        row("q", "Quit"),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
