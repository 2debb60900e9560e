use crate::scheduler::ScanState;
use crate::spectrum::Rgb;
use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    /// Terminal color for a palette entry
    pub fn color(rgb: Rgb) -> Color {
        Color::Rgb(rgb.r, rgb.g, rgb.b)
    }

    /// Style for selected row
    pub fn selected_style() -> Style {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for header
    pub fn header_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn help_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn status_style() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn error_style() -> Style {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the active band tab
    pub fn active_tab_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    /// Style for the scan state indicator
    pub fn scan_state_style(state: ScanState) -> Style {
        let color = match state {
            ScanState::ScanInFlight => Color::Green,
            ScanState::ScanScheduled => Color::Cyan,
            ScanState::Disabled => Color::Yellow,
            ScanState::Idle => Color::Gray,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Style for signal strength
    pub fn signal_style(dbm: i32) -> Style {
        let color = match dbm {
            s if s >= -50 => Color::Green,
            s if s >= -70 => Color::Yellow,
            _ => Color::Red,
        };
        Style::default().fg(color)
    }
}
