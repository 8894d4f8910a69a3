//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::AlarmState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for the idle alarm state.
    pub idle: Color,
    /// Color for the low-pressure alarm state.
    pub alarm: Color,
    /// Color for the normal state.
    pub normal: Color,
    /// Color for the front channel chart line.
    pub front_line: Color,
    /// Color for the rear channel chart line.
    pub rear_line: Color,
    /// Color for threshold guide lines.
    pub guide: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows and card titles.
    pub header: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            idle: Color::Gray,
            alarm: Color::Red,
            normal: Color::Green,
            front_line: Color::Cyan,
            rear_line: Color::Magenta,
            guide: Color::Yellow,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            idle: Color::DarkGray,
            alarm: Color::Red,
            normal: Color::Green,
            front_line: Color::Blue,
            rear_line: Color::Magenta,
            guide: Color::Yellow,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for an alarm state
    pub fn state_style(&self, state: AlarmState) -> Style {
        match state {
            AlarmState::Normal => Style::default().fg(self.normal),
            AlarmState::Idle => Style::default().fg(self.idle),
            AlarmState::LowPressure => {
                Style::default().fg(self.alarm).add_modifier(Modifier::BOLD)
            }
        }
    }
}
