use crate::app::App;
use crate::components::Component;
use crate::scheduler::ScanState;
use crate::theme::Theme;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use std::time::Instant;

pub struct StatusBar;

impl Component for StatusBar {
    fn render(&self, frame: &mut Frame, area: Rect, app: &App) {
        let session = &app.session;
        let state = session.scan_state();

        // State indicator with countdown while waiting for the next tick
        let state_text = match (state, session.scheduler().time_until_tick(Instant::now())) {
            (ScanState::ScanScheduled, Some(left)) => format!("[{state}] next scan in {}s", left.as_secs() + 1),
            _ => format!("[{state}]"),
        };
        let state_span = Span::styled(state_text, Theme::scan_state_style(state));

        let status_style = if session.status().starts_with("Scan failed") {
            Theme::error_style()
        } else {
            Theme::status_style()
        };
        let mut spans = vec![state_span, Span::styled(format!(" {}", session.status()), status_style)];

        if let Some(summary) = session.last_scan() {
            spans.push(Span::styled(
                format!(" | Last scan {}: {} networks", summary.at.format("%H:%M:%S"), summary.networks),
                Theme::status_style(),
            ));
        }

        spans.push(Span::styled(
            format!(" | \u{2265} {} dBm", session.threshold_dbm()),
            Theme::status_style(),
        ));
        spans.push(Span::styled(
            " | Space Scan | d Device | Tab Band | +/- Threshold | ? Help | q Quit",
            Theme::help_style(),
        ));

        let paragraph = Paragraph::new(Line::from(spans));
        frame.render_widget(paragraph, area);
    }
}
