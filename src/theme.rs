use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme built from config. Only the first call wins.
pub fn init(config: &ThemeConfig) {
    let _ = THEME.set(config.clone().into_theme());
}

/// Get the active theme, falling back to the default when `init` was never called.
pub fn current() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub due: Style,
    pub notified: Style,
    pub accent: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::White).bg(Color::DarkGray),
            due: Style::default().fg(Color::Red),
            notified: Style::default().fg(Color::Gray),
            accent: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    /// Get a built-in preset by name.
    pub fn preset(name: &str) -> Self {
        match name {
            "dracula" => Self::dracula(),
            "gruvbox" => Self::gruvbox(),
            "nord" => Self::nord(),
            _ => Self::default(),
        }
    }

    fn dracula() -> Self {
        Self {
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(139, 233, 253)),
            header: Style::default().fg(Color::Rgb(248, 248, 242)).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(98, 114, 164)),
            border: Style::default().fg(Color::Rgb(68, 71, 90)),
            status: Style::default()
                .fg(Color::Rgb(248, 248, 242))
                .bg(Color::Rgb(68, 71, 90)),
            due: Style::default().fg(Color::Rgb(255, 85, 85)),
            notified: Style::default().fg(Color::Rgb(98, 114, 164)),
            accent: Style::default().fg(Color::Rgb(80, 250, 123)).add_modifier(Modifier::BOLD),
        }
    }

    fn gruvbox() -> Self {
        Self {
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(131, 165, 152)),
            header: Style::default().fg(Color::Rgb(235, 219, 178)).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(146, 131, 116)),
            border: Style::default().fg(Color::Rgb(102, 92, 84)),
            status: Style::default()
                .fg(Color::Rgb(235, 219, 178))
                .bg(Color::Rgb(80, 73, 69)),
            due: Style::default().fg(Color::Rgb(251, 73, 52)),
            notified: Style::default().fg(Color::Rgb(146, 131, 116)),
            accent: Style::default().fg(Color::Rgb(184, 187, 38)).add_modifier(Modifier::BOLD),
        }
    }

    fn nord() -> Self {
        Self {
            selected: Style::default().fg(Color::Black).bg(Color::Rgb(136, 192, 208)),
            header: Style::default().fg(Color::Rgb(229, 233, 240)).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Rgb(76, 86, 106)),
            border: Style::default().fg(Color::Rgb(67, 76, 94)),
            status: Style::default()
                .fg(Color::Rgb(229, 233, 240))
                .bg(Color::Rgb(67, 76, 94)),
            due: Style::default().fg(Color::Rgb(191, 97, 106)),
            notified: Style::default().fg(Color::Rgb(76, 86, 106)),
            accent: Style::default().fg(Color::Rgb(163, 190, 140)).add_modifier(Modifier::BOLD),
        }
    }
}

// ── TOML config types ──

/// The `[theme]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub preset: Option<String>,
    pub selected_fg: Option<String>,
    pub selected_bg: Option<String>,
    pub header_fg: Option<String>,
    pub dim_fg: Option<String>,
    pub border_fg: Option<String>,
    pub status_fg: Option<String>,
    pub status_bg: Option<String>,
    pub due_fg: Option<String>,
    pub notified_fg: Option<String>,
}

impl ThemeConfig {
    pub fn into_theme(self) -> Theme {
        let mut theme = self
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        let fg = |style: Style, value: &Option<String>| match value.as_deref().and_then(parse_color) {
            Some(c) => style.fg(c),
            None => style,
        };
        let bg = |style: Style, value: &Option<String>| match value.as_deref().and_then(parse_color) {
            Some(c) => style.bg(c),
            None => style,
        };

        theme.selected = bg(fg(theme.selected, &self.selected_fg), &self.selected_bg);
        theme.header = fg(theme.header, &self.header_fg);
        theme.dim = fg(theme.dim, &self.dim_fg);
        theme.border = fg(theme.border, &self.border_fg);
        theme.status = bg(fg(theme.status, &self.status_fg), &self.status_bg);
        theme.due = fg(theme.due, &self.due_fg);
        theme.notified = fg(theme.notified, &self.notified_fg);
        theme
    }
}

/// Parse a color string: hex "#rrggbb", or named colors.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#').filter(|h| h.len() == 6) {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "lightred" => Some(Color::LightRed),
        "lightgreen" => Some(Color::LightGreen),
        "lightblue" => Some(Color::LightBlue),
        _ => None,
    }
}
