//! Dark and light palettes with semantic styles.

use ratatui::style::{Color, Modifier, Style};

use guardian_config::Preferences;
use guardian_core::RowClass;

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub secondary: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

const DARK: Palette = Palette {
    background: Color::Rgb(30, 31, 41),  // #1e1f29
    surface: Color::Rgb(40, 42, 54),     // #282a36
    text: Color::Rgb(189, 193, 207),     // #bdc1cf
    muted: Color::Rgb(98, 114, 164),     // #6272a4
    accent: Color::Rgb(225, 53, 255),    // #e135ff
    secondary: Color::Rgb(128, 255, 234), // #80ffea
    border: Color::Rgb(98, 114, 164),    // #6272a4
    success: Color::Rgb(80, 250, 123),   // #50fa7b
    warning: Color::Rgb(241, 250, 140),  // #f1fa8c
    error: Color::Rgb(255, 99, 99),      // #ff6363
    info: Color::Rgb(139, 233, 253),     // #8be9fd
};

const LIGHT: Palette = Palette {
    background: Color::Rgb(250, 250, 252), // #fafafc
    surface: Color::Rgb(229, 231, 240),    // #e5e7f0
    text: Color::Rgb(40, 42, 54),          // #282a36
    muted: Color::Rgb(110, 115, 140),      // #6e738c
    accent: Color::Rgb(142, 36, 170),      // #8e24aa
    secondary: Color::Rgb(0, 121, 107),    // #00796b
    border: Color::Rgb(160, 165, 190),     // #a0a5be
    success: Color::Rgb(46, 125, 50),      // #2e7d32
    warning: Color::Rgb(178, 106, 0),      // #b26a00
    error: Color::Rgb(198, 40, 40),        // #c62828
    info: Color::Rgb(2, 119, 189),         // #0277bd
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl From<Preferences> for Theme {
    fn from(prefs: Preferences) -> Self {
        if prefs.dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            dark: true,
            palette: DARK,
        }
    }

    pub fn light() -> Self {
        Self {
            dark: false,
            palette: LIGHT,
        }
    }

    pub fn name(&self) -> &'static str {
        if self.dark { "dark" } else { "light" }
    }

    // ── Semantic styles ──────────────────────────────────────────

    pub fn base(&self) -> Style {
        Style::default()
            .fg(self.palette.text)
            .bg(self.palette.background)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.palette.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.palette.secondary)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn table_selected(&self) -> Style {
        Style::default()
            .bg(self.palette.surface)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    pub fn key_hint_key(&self) -> Style {
        Style::default()
            .fg(self.palette.secondary)
            .add_modifier(Modifier::BOLD)
    }

    /// Row colour for a device classification.
    pub fn row(&self, class: RowClass) -> Style {
        let p = &self.palette;
        match class {
            RowClass::Blocked => Style::default().fg(p.error),
            RowClass::Scheduled => Style::default().fg(p.warning),
            RowClass::LongOnline => Style::default().fg(p.info).add_modifier(Modifier::BOLD),
            RowClass::Online => Style::default().fg(p.success),
            RowClass::Neutral => Style::default().fg(p.muted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_picks_palette() {
        let dark = Theme::from(Preferences { dark_mode: true });
        assert!(dark.dark);
        assert_eq!(dark.name(), "dark");
        assert_eq!(Theme::from(Preferences::default()), Theme::light());
    }

    #[test]
    fn blocked_and_online_rows_differ() {
        let theme = Theme::dark();
        assert_ne!(theme.row(RowClass::Blocked), theme.row(RowClass::Online));
        assert_ne!(theme.row(RowClass::LongOnline), theme.row(RowClass::Online));
    }
}
