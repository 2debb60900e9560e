use crate::app::App;
use crate::components::Component;
use crate::session::TabSet;
use crate::theme::Theme;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};
use ratatui::Frame;

/// Header line: one tab per band on the left, the device selector on the
/// right.
pub struct BandTabs;

impl Component for BandTabs {
    fn render(&self, frame: &mut Frame, area: Rect, app: &App) {
        let session = &app.session;
        let device = match session.pending_adapter() {
            Some(pending) => format!("{pending} (querying)"),
            None => session.adapter().unwrap_or("(none)").to_string(),
        };
        let device_line = Line::from(vec![
            Span::styled("Device: ", Theme::help_style()),
            Span::styled(device, Theme::title_style()),
            Span::styled(" [d] ", Theme::help_style()),
        ]);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(device_line.width() as u16),
            ])
            .split(area);

        let tab_style = match session.tabs() {
            TabSet::Unavailable => Theme::error_style(),
            _ => Theme::active_tab_style(),
        };

        let tabs = Tabs::new(session.tabs().titles())
            .select(session.current_tab())
            .style(Theme::border_style())
            .highlight_style(tab_style)
            .divider(Span::styled("|", Theme::help_style()));

        frame.render_widget(tabs, chunks[0]);
        frame.render_widget(Paragraph::new(device_line), chunks[1]);
    }
}
