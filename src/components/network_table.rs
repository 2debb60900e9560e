use crate::app::App;
use crate::components::Component;
use crate::scanner::NetworkRecord;
use crate::spectrum::network_color;
use crate::theme::Theme;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

pub struct NetworkTable;

impl Component for NetworkTable {
    fn render(&self, frame: &mut Frame, area: Rect, app: &App) {
        let session = &app.session;
        let records = session.visible_records();

        let header_cells = ["BSSID", "SSID", "Channel", "Frequency", "Bandwidth", "Signal"]
            .into_iter()
            .map(header_cell);
        let header = Row::new(header_cells).style(Theme::header_style()).height(1);

        // Swatch colors match the spectrum, which colors by the same order.
        let rows = records.iter().enumerate().map(|(rank, network)| network_row(rank, network));

        let band = session
            .current_band()
            .map(|b| b.to_string())
            .unwrap_or_default();
        let title = format!(" {} Networks ({} shown) ", band, records.len());

        let table = Table::new(
            rows,
            [
                Constraint::Length(20), // BSSID
                Constraint::Min(16),    // SSID
                Constraint::Length(8),  // Channel
                Constraint::Length(10), // Frequency
                Constraint::Length(10), // Bandwidth
                Constraint::Length(9),  // Signal
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Theme::border_style())
                .title(Span::styled(title, Theme::title_style())),
        )
        .row_highlight_style(Theme::selected_style())
        .highlight_symbol("\u{25b6} ");

        let mut table_state = TableState::default();
        table_state.select(session.selected_index());

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

fn network_row(rank: usize, network: &NetworkRecord) -> Row<'static> {
    let swatch = Span::styled("\u{25a0} ", Style::default().fg(Theme::color(network_color(rank))));
    let bssid_cell = Cell::from(Line::from(vec![swatch, Span::raw(network.bssid.clone())]));

    Row::new([
        bssid_cell,
        Cell::from(truncate(&network.ssid, 32)),
        Cell::from(network.channel_label()),
        Cell::from(format!("{} MHz", network.frequency_mhz)),
        Cell::from(format!("{} MHz", network.bandwidth_mhz)),
        Cell::from(Span::styled(
            format!("{} dBm", network.signal_dbm),
            Theme::signal_style(network.signal_dbm),
        )),
    ])
}

fn header_cell(name: &str) -> Cell<'static> {
    Cell::from(Span::styled(name.to_string(), Theme::header_style()))
}

/// Shorten to `max_chars` characters, counting chars rather than bytes since
/// SSIDs are arbitrary UTF-8.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}
