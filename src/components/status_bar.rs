use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::InputMode;
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, mode: InputMode, message: Option<&str>) {
        let t = theme::current();
        let w = area.width as usize;

        let mode_str = match mode {
            InputMode::Form => " [Form]",
            InputMode::ConfirmDelete => " [Delete]",
            InputMode::Normal | InputMode::Tray => "",
        };

        let right_text = match message {
            Some(msg) => format!(" {} ", msg),
            None if w >= 80 => {
                " jk:Move a:Add e:Edit d:Delete Esc:Close ?:Help q:Quit ".to_string()
            }
            None if w >= 50 => " a:Add e:Edit d:Del q:Quit ".to_string(),
            None => " ?:Help q:Quit ".to_string(),
        };

        let left = format!(" Reminders{} ", mode_str);
        let padding = " ".repeat(w.saturating_sub(left.len() + right_text.len()));

        let line = Line::from(vec![
            Span::styled(left, t.status),
            Span::styled(padding, t.status),
            Span::styled(right_text, t.status),
        ]);

        let bar = Paragraph::new(line).style(t.status);
        frame.render_widget(bar, area);
    }
}
