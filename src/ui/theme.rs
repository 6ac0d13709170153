//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::ColorClass;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for fast samples (under 40ms).
    pub fast: Color,
    /// Color for medium samples (40ms to 99ms).
    pub medium: Color,
    /// Color for slow samples (100ms and above).
    pub slow: Color,
    /// Color for unreachable samples.
    pub neutral: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            fast: Color::Green,
            medium: Color::Yellow,
            slow: Color::Red,
            neutral: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            fast: Color::Green,
            medium: Color::Yellow,
            slow: Color::Red,
            neutral: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Foreground color for a token color class.
    pub fn color(&self, class: ColorClass) -> Color {
        match class {
            ColorClass::Fast => self.fast,
            ColorClass::Medium => self.medium,
            ColorClass::Slow => self.slow,
            ColorClass::Neutral => self.neutral,
        }
    }

    /// Text style for a token color class.
    pub fn token_style(&self, class: ColorClass) -> Style {
        let style = Style::default().fg(self.color(class));
        match class {
            ColorClass::Slow => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_classes_map_to_distinct_colors() {
        for theme in [Theme::dark(), Theme::light()] {
            let colors = [
                theme.color(ColorClass::Fast),
                theme.color(ColorClass::Medium),
                theme.color(ColorClass::Slow),
                theme.color(ColorClass::Neutral),
            ];
            for (i, a) in colors.iter().enumerate() {
                for b in &colors[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_traffic_light_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.color(ColorClass::Fast), Color::Green);
        assert_eq!(theme.color(ColorClass::Medium), Color::Yellow);
        assert_eq!(theme.color(ColorClass::Slow), Color::Red);
    }
}
