//! Color palettes for the search screen.
//!
//! Low-saturation base colors with a single accent used for focus, the
//! selected row and the "create" marker.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

pub mod colors {
    use ratatui::style::Color;

    /// Deep background
    pub const BG_DEEP: Color = Color::Rgb(26, 27, 38); // #1a1b26

    /// Selected row background
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42

    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261

    pub const BORDER_FOCUS: Color = Color::Rgb(125, 145, 200); // #7d91c8

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5

    /// Hints, placeholders, status line. Lightened to stay readable on BG_DEEP.
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7

    pub const ACCENT_SECONDARY: Color = Color::Rgb(187, 154, 247); // #bb9af7

    /// Failures on the status line
    pub const STATUS_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e
}

/// Which palette to draw with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ThemePalette {
        match self {
            Self::Dark => ThemePalette::dark(),
            Self::Light => ThemePalette::light(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub bg: Color,
    pub fg: Color,
    pub hint: Color,
    pub border: Color,
    pub border_focus: Color,
    pub selected_bg: Color,
    pub error: Color,
}

impl ThemePalette {
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(47, 107, 231),        // Rich blue
            accent_alt: Color::Rgb(124, 93, 198),    // Purple
            bg: Color::Rgb(250, 250, 252),           // Off-white
            fg: Color::Rgb(36, 41, 46),              // Near-black
            hint: Color::Rgb(125, 134, 144),         // Medium gray
            border: Color::Rgb(216, 222, 228),       // Border gray
            border_focus: Color::Rgb(47, 107, 231),  // Same as accent
            selected_bg: Color::Rgb(232, 236, 244),  // Pale blue-gray
            error: Color::Rgb(196, 43, 28),          // Brick red
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            bg: colors::BG_DEEP,
            fg: colors::TEXT_PRIMARY,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            border_focus: colors::BORDER_FOCUS,
            selected_bg: colors::BG_HIGHLIGHT,
            error: colors::STATUS_ERROR,
        }
    }

    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focus_style(self) -> Style {
        Style::default().fg(self.border_focus)
    }

    /// Selected row in the match list
    pub fn selected_style(self) -> Style {
        Style::default()
            .bg(self.selected_bg)
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// The synthetic "create" row
    pub fn create_style(self) -> Style {
        Style::default()
            .fg(self.accent_alt)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn error_style(self) -> Style {
        Style::default().fg(self.error)
    }
}
