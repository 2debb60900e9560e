use crate::components::{BandTabs, Component, NetworkTable, SpectrumView, StatusBar};
use crate::scanner::{Backend, ScanExecutor};
use crate::session::{ScannerSession, THRESHOLD_PAGE_STEP};
use crate::theme::Theme;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use std::time::Instant;

pub struct App {
    pub session: ScannerSession,
    executor: ScanExecutor,
    pub should_quit: bool,
    pub show_help: bool,
}

impl App {
    /// Build the app and load the adapter list. No device is selected yet.
    pub async fn new(backend: Backend) -> Self {
        let adapters = backend.list_adapters().await;
        tracing::info!(?backend, adapters = ?adapters, "wireless adapters found");

        let mut session = ScannerSession::new(adapters);
        if session.adapters().is_empty() {
            session.set_status("No wireless devices found.");
        }

        Self {
            session,
            executor: ScanExecutor::new(backend),
            should_quit: false,
            show_help: false,
        }
    }

    /// Move the device selector to the next adapter. Its bands are looked
    /// up in the background and arrive through [`Self::on_tick`].
    pub fn cycle_device(&mut self) {
        let Some(adapter) = self.session.next_adapter().map(str::to_string) else {
            self.session.set_status("No wireless devices found.");
            return;
        };
        self.session.begin_device_query(&adapter);
        self.executor.query_bands(adapter);
    }

    pub fn toggle_scanning(&mut self) {
        if let Some(ticket) = self.session.start_stop(Instant::now()) {
            self.executor.dispatch(ticket);
        }
    }

    /// Collect finished band queries and scans, then launch the next scan if
    /// a tick is due.
    pub fn on_tick(&mut self) {
        while let Some(report) = self.executor.try_next_bands() {
            self.session.finish_device_query(&report.adapter, report.bands);
        }
        while let Some(completion) = self.executor.try_next() {
            self.session.apply_completion(completion);
        }
        if let Some(ticket) = self.session.poll_due(Instant::now()) {
            self.executor.dispatch(ticket);
        }
    }

    pub fn navigate_up(&mut self) {
        self.session.select_previous();
    }

    pub fn navigate_down(&mut self) {
        self.session.select_next();
    }

    pub fn next_tab(&mut self) {
        self.session.next_tab();
    }

    pub fn previous_tab(&mut self) {
        self.session.previous_tab();
    }

    pub fn raise_threshold(&mut self, page: bool) {
        self.session.adjust_threshold(if page { THRESHOLD_PAGE_STEP } else { 1 });
    }

    pub fn lower_threshold(&mut self, page: bool) {
        self.session.adjust_threshold(if page { -THRESHOLD_PAGE_STEP } else { -1 });
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Band tabs
                Constraint::Min(10),    // Table and spectrum
                Constraint::Length(1),  // Status bar
            ])
            .split(frame.area());

        BandTabs.render(frame, chunks[0], self);

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);

        NetworkTable.render(frame, main_chunks[0], self);
        SpectrumView.render(frame, main_chunks[1], self);
        StatusBar.render(frame, chunks[2], self);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = centered_rect(50, 60, frame.area());

        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled("Keyboard Shortcuts", Theme::title_style())),
            Line::from(""),
            Line::from("Space / Enter    Start or stop scanning"),
            Line::from("d                Next wireless device"),
            Line::from("Tab / \u{2192} / l      Next band"),
            Line::from("S-Tab / \u{2190} / h    Previous band"),
            Line::from("\u{2191}/\u{2193} or k/j       Select network"),
            Line::from("+ / -            Threshold \u{00b1}1 dBm"),
            Line::from("PgUp / PgDn      Threshold \u{00b1}10 dBm"),
            Line::from("?                Toggle this help"),
            Line::from("q / Esc          Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "Networks rescan every 5 seconds while scanning is on.",
                Theme::help_style(),
            )),
            Line::from(""),
            Line::from("Press ? to close"),
        ];

        let paragraph = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .style(Theme::border_style())
                .title(Span::styled(" Help ", Theme::title_style())),
        );

        frame.render_widget(Clear, area);
        frame.render_widget(paragraph, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
