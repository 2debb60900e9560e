//! Everything the control loop owns between redraws.

use crate::scanner::{Band, NetworkRecord, ScanCompletion};
use crate::scheduler::{
    filter_by_threshold, sort_by_signal, Disposition, ScanScheduler, ScanState, ScanTicket,
};
use crate::spectrum::SpectrumFrame;
use chrono::{DateTime, Local};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

pub const MIN_THRESHOLD_DBM: i32 = -130;
pub const MAX_THRESHOLD_DBM: i32 = 20;
pub const THRESHOLD_PAGE_STEP: i32 = 10;

pub const NO_DEVICE_TAB: &str = "(select device)";
pub const UNAVAILABLE_TAB: &str = "Error";
pub const UNAVAILABLE_MESSAGE: &str = "Unable to get frequency information for this device";

/// Which tabs the band view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabSet {
    NoDevice,
    /// A device is selected but its bands could not be determined.
    Unavailable,
    Bands(Vec<Band>),
}

impl TabSet {
    pub fn titles(&self) -> Vec<String> {
        match self {
            TabSet::NoDevice => vec![NO_DEVICE_TAB.to_string()],
            TabSet::Unavailable => vec![UNAVAILABLE_TAB.to_string()],
            TabSet::Bands(bands) => bands.iter().map(ToString::to_string).collect(),
        }
    }

    fn len(&self) -> usize {
        match self {
            TabSet::Bands(bands) => bands.len(),
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub at: DateTime<Local>,
    pub networks: usize,
}

#[derive(Debug)]
pub struct ScannerSession {
    adapters: Vec<String>,
    adapter_index: Option<usize>,
    /// Adapter whose band query is still running. The selector moves here at
    /// once; tabs follow when the query reports back.
    pending_adapter: Option<String>,
    tabs: TabSet,
    current_tab: usize,
    threshold_dbm: i32,
    /// Latest applied scan per band, strongest first.
    by_band: BTreeMap<Band, Vec<NetworkRecord>>,
    /// Selected BSSID per band. Kept even when the network drops out of a
    /// scan so it highlights again when it comes back.
    selections: HashMap<Band, String>,
    scheduler: ScanScheduler,
    status: String,
    last_scan: Option<ScanSummary>,
}

impl ScannerSession {
    pub fn new(adapters: Vec<String>) -> Self {
        Self::with_scheduler(adapters, ScanScheduler::default())
    }

    pub fn with_scheduler(adapters: Vec<String>, scheduler: ScanScheduler) -> Self {
        Self {
            adapters,
            adapter_index: None,
            pending_adapter: None,
            tabs: TabSet::NoDevice,
            current_tab: 0,
            threshold_dbm: MIN_THRESHOLD_DBM,
            by_band: BTreeMap::new(),
            selections: HashMap::new(),
            scheduler,
            status: "Ready.".to_string(),
            last_scan: None,
        }
    }

    pub fn adapters(&self) -> &[String] {
        &self.adapters
    }

    pub fn adapter(&self) -> Option<&str> {
        self.adapter_index
            .and_then(|i| self.adapters.get(i))
            .map(String::as_str)
    }

    /// Adapter the device selector moves to next, wrapping around. Counts
    /// from a pending selection when there is one.
    pub fn next_adapter(&self) -> Option<&str> {
        if self.adapters.is_empty() {
            return None;
        }
        let current = self
            .pending_adapter
            .as_deref()
            .and_then(|pending| self.adapters.iter().position(|a| a == pending))
            .or(self.adapter_index);
        let next = current.map_or(0, |i| (i + 1) % self.adapters.len());
        self.adapters.get(next).map(String::as_str)
    }

    pub fn pending_adapter(&self) -> Option<&str> {
        self.pending_adapter.as_deref()
    }

    /// Point the selector at `adapter` while its bands are looked up.
    pub fn begin_device_query(&mut self, adapter: &str) {
        tracing::debug!(adapter, "querying supported bands");
        self.pending_adapter = Some(adapter.to_string());
        self.status = format!("Querying {adapter}...");
    }

    /// Apply a finished band query. Reports for an adapter the selector has
    /// since moved away from are dropped. Returns whether it was applied.
    pub fn finish_device_query(&mut self, adapter: &str, bands: BTreeSet<Band>) -> bool {
        if self.pending_adapter.as_deref() != Some(adapter) {
            tracing::debug!(adapter, "discarding band query for a device no longer selected");
            return false;
        }
        self.pending_adapter = None;
        self.select_device(adapter, bands);
        true
    }

    /// Switch to `adapter` whose radio supports `bands`. Rebuilds the tabs and
    /// drops every per-band result; a running scheduler follows the new
    /// adapter from its next tick.
    pub fn select_device(&mut self, adapter: &str, bands: BTreeSet<Band>) {
        let Some(index) = self.adapters.iter().position(|a| a == adapter) else {
            tracing::warn!(adapter, "selected adapter is not in the device list");
            return;
        };

        self.adapter_index = Some(index);
        self.tabs = if bands.is_empty() {
            TabSet::Unavailable
        } else {
            TabSet::Bands(bands.into_iter().collect())
        };
        self.current_tab = 0;
        self.by_band.clear();
        self.selections.clear();

        if self.scheduler.is_enabled() {
            self.scheduler.retarget(adapter.to_string());
        }

        tracing::info!(adapter, tabs = ?self.tabs, "device selected");
        self.status = format!("Selected device: {adapter}");
    }

    /// Toggle periodic scanning. Returns the ticket of the immediate scan to
    /// dispatch when scanning starts.
    pub fn start_stop(&mut self, now: Instant) -> Option<ScanTicket> {
        if self.scheduler.is_enabled() {
            self.scheduler.disable();
            tracing::info!("scanning stopped");
            self.status = "Scanning stopped.".to_string();
            return None;
        }

        let Some(adapter) = self.adapter().map(str::to_string) else {
            self.status = "Please select a device first.".to_string();
            return None;
        };

        tracing::info!(adapter, "scanning started");
        self.status = format!("Scanning {adapter}...");
        self.scheduler.enable(adapter, now)
    }

    /// Ticket of a scan that is due now, if any.
    pub fn poll_due(&mut self, now: Instant) -> Option<ScanTicket> {
        self.scheduler.poll(now)
    }

    pub fn apply_completion(&mut self, completion: ScanCompletion) -> Disposition {
        let disposition = self.scheduler.finish(&completion.ticket);
        if disposition == Disposition::Discard {
            return disposition;
        }

        match completion.outcome {
            Ok(mut records) => {
                sort_by_signal(&mut records);
                let total = records.len();
                self.by_band.clear();
                for record in records {
                    let band = record.band();
                    if band.is_classified() {
                        self.by_band.entry(band).or_default().push(record);
                    }
                }
                self.last_scan = Some(ScanSummary {
                    at: Local::now(),
                    networks: total,
                });
                tracing::info!(adapter = %completion.ticket.adapter, networks = total, "scan applied");
                self.status = format!("Scanning {}...", completion.ticket.adapter);
            }
            Err(e) => {
                self.status = format!("Scan failed: {e}");
            }
        }
        disposition
    }

    pub fn scan_state(&self) -> ScanState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &ScanScheduler {
        &self.scheduler
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn last_scan(&self) -> Option<&ScanSummary> {
        self.last_scan.as_ref()
    }

    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }

    pub fn current_tab(&self) -> usize {
        self.current_tab
    }

    pub fn next_tab(&mut self) {
        self.current_tab = (self.current_tab + 1) % self.tabs.len();
    }

    pub fn previous_tab(&mut self) {
        let len = self.tabs.len();
        self.current_tab = (self.current_tab + len - 1) % len;
    }

    pub fn current_band(&self) -> Option<Band> {
        match &self.tabs {
            TabSet::Bands(bands) => bands.get(self.current_tab).copied(),
            _ => None,
        }
    }

    pub fn threshold_dbm(&self) -> i32 {
        self.threshold_dbm
    }

    pub fn adjust_threshold(&mut self, delta: i32) {
        self.threshold_dbm = (self.threshold_dbm + delta).clamp(MIN_THRESHOLD_DBM, MAX_THRESHOLD_DBM);
    }

    /// Networks of the current tab at or above the threshold, strongest first.
    pub fn visible_records(&self) -> Vec<NetworkRecord> {
        self.current_band()
            .and_then(|band| self.by_band.get(&band))
            .map(|records| filter_by_threshold(records, self.threshold_dbm))
            .unwrap_or_default()
    }

    pub fn selected_bssid(&self) -> Option<&str> {
        self.current_band()
            .and_then(|band| self.selections.get(&band))
            .map(String::as_str)
    }

    /// Row of the selected network within [`Self::visible_records`].
    pub fn selected_index(&self) -> Option<usize> {
        let bssid = self.selected_bssid()?;
        self.visible_records().iter().position(|r| r.bssid == bssid)
    }

    pub fn select_next(&mut self) {
        self.move_selection(|index, len| index.map_or(0, |i| (i + 1).min(len - 1)));
    }

    pub fn select_previous(&mut self) {
        self.move_selection(|index, _| index.map_or(0, |i| i.saturating_sub(1)));
    }

    fn move_selection(&mut self, step: impl FnOnce(Option<usize>, usize) -> usize) {
        let Some(band) = self.current_band() else {
            return;
        };
        let visible = self.visible_records();
        if visible.is_empty() {
            return;
        }
        let target = step(self.selected_index(), visible.len());
        if let Some(record) = visible.get(target) {
            self.selections.insert(band, record.bssid.clone());
        }
    }

    /// Inputs for one spectrum redraw of the current tab.
    pub fn spectrum_frame(&self, width: u32, height: u32) -> SpectrumFrame {
        SpectrumFrame {
            band: self.current_band(),
            records: self.visible_records(),
            selected_bssid: self.selected_bssid().map(str::to_string),
            width,
            height,
            threshold_dbm: self.threshold_dbm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ScanError;
    use crate::scheduler::SCAN_PERIOD;
    use std::time::Duration;

    fn network(bssid: &str, freq: u32, signal: i32) -> NetworkRecord {
        NetworkRecord {
            bssid: bssid.to_string(),
            ssid: format!("net-{bssid}"),
            channel: Some(1),
            frequency_mhz: freq,
            bandwidth_mhz: 20,
            signal_dbm: signal,
        }
    }

    fn dual_band() -> BTreeSet<Band> {
        [Band::Band5GHz, Band::Band2_4GHz].into_iter().collect()
    }

    fn session_with_device() -> ScannerSession {
        let mut session = ScannerSession::new(vec!["wlan0".to_string(), "wlan1".to_string()]);
        session.select_device("wlan0", dual_band());
        session
    }

    fn home_scan() -> Vec<NetworkRecord> {
        vec![
            network("02", 2437, -70),
            network("01", 2412, -40),
            network("03", 5180, -55),
            network("04", 900, -30),
        ]
    }

    fn complete(ticket: ScanTicket, outcome: Result<Vec<NetworkRecord>, ScanError>) -> ScanCompletion {
        ScanCompletion { ticket, outcome }
    }

    #[test]
    fn test_initial_state() {
        let session = ScannerSession::new(vec!["wlan0".to_string()]);
        assert_eq!(session.status(), "Ready.");
        assert_eq!(session.tabs().titles(), vec![NO_DEVICE_TAB.to_string()]);
        assert_eq!(session.threshold_dbm(), -130);
        assert_eq!(session.scan_state(), ScanState::Idle);
        assert!(session.adapter().is_none());
        assert_eq!(session.next_adapter(), Some("wlan0"));
    }

    #[test]
    fn test_start_without_device_asks_for_one() {
        let mut session = ScannerSession::new(vec![]);
        assert!(session.start_stop(Instant::now()).is_none());
        assert_eq!(session.status(), "Please select a device first.");
        assert_eq!(session.scan_state(), ScanState::Idle);
        assert_eq!(session.next_adapter(), None);
    }

    #[test]
    fn test_select_device_builds_tabs_in_band_order() {
        let session = session_with_device();
        assert_eq!(session.adapter(), Some("wlan0"));
        assert_eq!(session.status(), "Selected device: wlan0");
        assert_eq!(session.tabs().titles(), vec!["2.4 GHz".to_string(), "5 GHz".to_string()]);
        assert_eq!(session.current_band(), Some(Band::Band2_4GHz));
        assert_eq!(session.next_adapter(), Some("wlan1"));
    }

    #[test]
    fn test_device_without_bands_shows_error_tab() {
        let mut session = ScannerSession::new(vec!["wlan0".to_string()]);
        session.select_device("wlan0", BTreeSet::new());
        assert_eq!(session.tabs(), &TabSet::Unavailable);
        assert_eq!(session.tabs().titles(), vec![UNAVAILABLE_TAB.to_string()]);
        assert!(session.current_band().is_none());

        // Scanning still works; the results just have nowhere to show.
        let ticket = session.start_stop(Instant::now()).unwrap();
        assert_eq!(session.apply_completion(complete(ticket, Ok(home_scan()))), Disposition::Apply);
        assert!(session.visible_records().is_empty());
    }

    #[test]
    fn test_scan_results_split_by_band_and_sorted() {
        let mut session = session_with_device();
        let ticket = session.start_stop(Instant::now()).unwrap();
        assert_eq!(session.status(), "Scanning wlan0...");
        assert_eq!(session.scan_state(), ScanState::ScanInFlight);

        assert_eq!(session.apply_completion(complete(ticket, Ok(home_scan()))), Disposition::Apply);
        assert_eq!(session.scan_state(), ScanState::ScanScheduled);
        assert_eq!(session.last_scan().unwrap().networks, 4);

        let bssids: Vec<_> = session.visible_records().into_iter().map(|r| r.bssid).collect();
        assert_eq!(bssids, ["01", "02"]);

        session.next_tab();
        let bssids: Vec<_> = session.visible_records().into_iter().map(|r| r.bssid).collect();
        assert_eq!(bssids, ["03"]);

        session.next_tab();
        assert_eq!(session.current_band(), Some(Band::Band2_4GHz));
        session.previous_tab();
        assert_eq!(session.current_band(), Some(Band::Band5GHz));
    }

    #[test]
    fn test_threshold_filters_immediately_and_clamps() {
        let mut session = session_with_device();
        let ticket = session.start_stop(Instant::now()).unwrap();
        session.apply_completion(complete(ticket, Ok(home_scan())));

        session.adjust_threshold(80);
        assert_eq!(session.threshold_dbm(), -50);
        let bssids: Vec<_> = session.visible_records().into_iter().map(|r| r.bssid).collect();
        assert_eq!(bssids, ["01"]);

        session.adjust_threshold(1000);
        assert_eq!(session.threshold_dbm(), MAX_THRESHOLD_DBM);
        assert!(session.visible_records().is_empty());

        session.adjust_threshold(-1000);
        assert_eq!(session.threshold_dbm(), MIN_THRESHOLD_DBM);
        assert_eq!(session.visible_records().len(), 2);
    }

    #[test]
    fn test_selection_is_per_band_and_survives_rescans() {
        let mut session = session_with_device();
        let ticket = session.start_stop(Instant::now()).unwrap();
        session.apply_completion(complete(ticket, Ok(home_scan())));

        assert!(session.selected_bssid().is_none());
        session.select_next();
        assert_eq!(session.selected_bssid(), Some("01"));
        session.select_next();
        session.select_next();
        assert_eq!(session.selected_bssid(), Some("02"));
        assert_eq!(session.selected_index(), Some(1));
        session.select_previous();
        assert_eq!(session.selected_bssid(), Some("01"));

        session.next_tab();
        assert!(session.selected_bssid().is_none());
        session.previous_tab();
        assert_eq!(session.selected_bssid(), Some("01"));

        // Network gone from the next scan: selection is kept but not shown.
        let now = Instant::now() + SCAN_PERIOD;
        let ticket = session.poll_due(now).unwrap();
        session.apply_completion(complete(ticket, Ok(vec![network("02", 2437, -60)])));
        assert_eq!(session.selected_bssid(), Some("01"));
        assert_eq!(session.selected_index(), None);
        let frame = session.spectrum_frame(100, 50);
        assert!(matches!(
            frame.layout(&crate::spectrum::LayoutConfig::default()),
            crate::spectrum::RenderPlan::Spectrum(_)
        ));
    }

    #[test]
    fn test_failed_scan_sets_status_and_keeps_schedule() {
        let mut session = session_with_device();
        let start = Instant::now();
        let ticket = session.start_stop(start).unwrap();
        let err = ScanError::TimedOut {
            command: "iw dev wlan0 scan".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(session.apply_completion(complete(ticket, Err(err))), Disposition::Apply);
        assert_eq!(session.status(), "Scan failed: `iw dev wlan0 scan` timed out after 30s");
        assert_eq!(session.scan_state(), ScanState::ScanScheduled);
        assert!(session.last_scan().is_none());
        assert!(session.poll_due(start + SCAN_PERIOD).is_some());
    }

    #[test]
    fn test_stop_discards_in_flight_result() {
        let mut session = session_with_device();
        let ticket = session.start_stop(Instant::now()).unwrap();
        assert!(session.start_stop(Instant::now()).is_none());
        assert_eq!(session.status(), "Scanning stopped.");
        assert_eq!(session.scan_state(), ScanState::Disabled);

        assert_eq!(session.apply_completion(complete(ticket, Ok(home_scan()))), Disposition::Discard);
        assert!(session.visible_records().is_empty());
        assert!(session.last_scan().is_none());
    }

    #[test]
    fn test_switching_device_drops_old_results() {
        let mut session = session_with_device();
        let start = Instant::now();
        let first = session.start_stop(start).unwrap();
        session.apply_completion(complete(first, Ok(home_scan())));
        session.select_next();

        let stale = session.poll_due(start + SCAN_PERIOD).unwrap();
        session.select_device("wlan1", [Band::Band2_4GHz].into_iter().collect());
        assert!(session.visible_records().is_empty());
        assert!(session.selected_bssid().is_none());
        assert_eq!(session.apply_completion(complete(stale, Ok(home_scan()))), Disposition::Discard);
        assert!(session.visible_records().is_empty());

        let fresh = session.poll_due(start + SCAN_PERIOD * 2).unwrap();
        assert_eq!(fresh.adapter, "wlan1");
        assert_eq!(session.apply_completion(complete(fresh, Ok(home_scan()))), Disposition::Apply);
        assert_eq!(session.visible_records().len(), 2);
    }

    #[test]
    fn test_spectrum_frame_reflects_view() {
        let mut session = session_with_device();
        let ticket = session.start_stop(Instant::now()).unwrap();
        session.apply_completion(complete(ticket, Ok(home_scan())));
        session.select_next();
        session.adjust_threshold(20);

        let frame = session.spectrum_frame(320, 96);
        assert_eq!(frame.band, Some(Band::Band2_4GHz));
        assert_eq!(frame.selected_bssid.as_deref(), Some("01"));
        assert_eq!(frame.threshold_dbm, -110);
        assert_eq!(frame.records.len(), 2);
        assert_eq!((frame.width, frame.height), (320, 96));
    }

    #[test]
    fn test_band_query_applies_only_to_pending_adapter() {
        let mut session = ScannerSession::new(vec!["wlan0".to_string(), "wlan1".to_string()]);
        assert_eq!(session.next_adapter(), Some("wlan0"));

        session.begin_device_query("wlan0");
        assert_eq!(session.status(), "Querying wlan0...");
        assert_eq!(session.pending_adapter(), Some("wlan0"));
        assert!(session.adapter().is_none());
        assert_eq!(session.next_adapter(), Some("wlan1"));

        // The user moved on before wlan0 answered.
        session.begin_device_query("wlan1");
        assert!(!session.finish_device_query("wlan0", dual_band()));
        assert!(session.adapter().is_none());
        assert_eq!(session.tabs(), &TabSet::NoDevice);

        assert!(session.finish_device_query("wlan1", [Band::Band2_4GHz].into_iter().collect()));
        assert_eq!(session.adapter(), Some("wlan1"));
        assert_eq!(session.pending_adapter(), None);
        assert_eq!(session.status(), "Selected device: wlan1");
        assert_eq!(session.tabs().titles(), vec!["2.4 GHz".to_string()]);

        // A late duplicate changes nothing.
        assert!(!session.finish_device_query("wlan1", BTreeSet::new()));
        assert_eq!(session.tabs().titles(), vec!["2.4 GHz".to_string()]);
    }

    #[test]
    fn test_unknown_adapter_is_ignored() {
        let mut session = session_with_device();
        session.select_device("eth0", dual_band());
        assert_eq!(session.adapter(), Some("wlan0"));
    }
}
