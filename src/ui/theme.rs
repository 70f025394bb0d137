//! Theme and styling configuration.
//!
//! A single [`TableTheme`] value carries every color the table widgets use, so
//! one set of rendering code serves both the dark and the light palettes.

use ratatui::style::{Color, Modifier, Style};

use crate::table::ActionVariant;

/// Color theme for the table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTheme {
    /// Theme name as used in configuration.
    pub name: &'static str,
    /// Primary foreground color.
    pub fg: Color,
    /// Secondary text, placeholders and disabled controls.
    pub muted: Color,
    /// Primary background color.
    pub bg: Color,
    /// Accent for titles, focused borders and the active page.
    pub accent: Color,
    /// Borders of unfocused blocks.
    pub border: Color,
    /// Header row foreground.
    pub header_fg: Color,
    /// Header row background.
    pub header_bg: Color,
    /// Background of the selected row.
    pub selection_bg: Color,
    /// Background of the open row menu.
    pub menu_bg: Color,
    /// Error banner foreground.
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
}

impl TableTheme {
    /// Palette for dark terminals.
    pub fn dark() -> Self {
        Self {
            name: "dark",
            fg: Color::White,
            muted: Color::DarkGray,
            bg: Color::Reset,
            accent: Color::Cyan,
            border: Color::Gray,
            header_fg: Color::Yellow,
            header_bg: Color::Reset,
            selection_bg: Color::Rgb(40, 44, 52),
            menu_bg: Color::Rgb(30, 30, 36),
            error: Color::LightRed,
            success: Color::LightGreen,
            warning: Color::Yellow,
            danger: Color::LightRed,
        }
    }

    /// Palette for light terminals.
    pub fn light() -> Self {
        Self {
            name: "light",
            fg: Color::Black,
            muted: Color::Gray,
            bg: Color::Reset,
            accent: Color::Blue,
            border: Color::DarkGray,
            header_fg: Color::Black,
            header_bg: Color::Rgb(229, 231, 235),
            selection_bg: Color::Rgb(219, 234, 254),
            menu_bg: Color::Rgb(249, 250, 251),
            error: Color::Red,
            success: Color::Green,
            warning: Color::Rgb(180, 83, 9),
            danger: Color::Red,
        }
    }

    /// Look up a palette by its configuration name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default().bg(self.selection_bg).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn error_banner(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    /// Style of a row menu entry.
    pub fn variant(&self, variant: ActionVariant) -> Style {
        let fg = match variant {
            ActionVariant::Default => self.fg,
            ActionVariant::Success => self.success,
            ActionVariant::Warning => self.warning,
            ActionVariant::Danger => self.danger,
        };
        Style::default().fg(fg).bg(self.menu_bg)
    }

    /// Color of a status badge, chosen from its text.
    pub fn status(&self, status: &str) -> Style {
        let fg = match status.to_ascii_lowercase().as_str() {
            "approved" | "active" | "confirmed" | "completed" | "paid" | "true" => self.success,
            "pending" | "processing" | "review" => self.warning,
            "rejected" | "cancelled" | "blocked" | "failed" | "false" => self.danger,
            _ => self.fg,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    /// Style of a page button.
    pub fn page_button(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.contrast())
                .bg(self.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.fg)
        }
    }

    /// Style of the prev/next controls.
    pub fn page_control(&self, enabled: bool) -> Style {
        if enabled {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }

    /// Style of a filter tab.
    pub fn tab(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(self.muted)
        }
    }

    /// Foreground drawn on top of accent-colored backgrounds.
    pub fn contrast(&self) -> Color {
        if self.name == "light" {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl Default for TableTheme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(TableTheme::by_name("dark"), Some(TableTheme::dark()));
        assert_eq!(TableTheme::by_name("light").unwrap().name, "light");
        assert!(TableTheme::by_name("neon").is_none());
    }

    #[test]
    fn test_variant_colors_differ_between_palettes() {
        let dark = TableTheme::dark();
        let light = TableTheme::light();
        assert_eq!(dark.variant(ActionVariant::Danger).fg, Some(Color::LightRed));
        assert_eq!(light.variant(ActionVariant::Danger).fg, Some(Color::Red));
        assert_eq!(dark.variant(ActionVariant::Default).fg, Some(Color::White));
    }

    #[test]
    fn test_status_badges() {
        let theme = TableTheme::dark();
        assert_eq!(theme.status("Approved").fg, Some(theme.success));
        assert_eq!(theme.status("pending").fg, Some(theme.warning));
        assert_eq!(theme.status("cancelled").fg, Some(theme.danger));
        assert_eq!(theme.status("draft").fg, Some(theme.fg));
    }
}
