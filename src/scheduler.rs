//! Periodic re-scan scheduling.
//!
//! [`ScanScheduler`] is a plain state machine driven by the control loop: it
//! never spawns anything itself. The loop calls [`ScanScheduler::poll`] on
//! every tick and dispatches whatever ticket it gets back, then feeds the
//! completion into [`ScanScheduler::finish`] to learn whether the result may
//! be applied.

use crate::scanner::NetworkRecord;
use std::fmt;
use std::time::{Duration, Instant};

/// Fixed re-scan period.
pub const SCAN_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Scanning has never been started.
    Idle,
    /// Enabled, waiting for the next tick.
    ScanScheduled,
    /// Enabled, one scan outstanding.
    ScanInFlight,
    /// Stopped by the user.
    Disabled,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanState::Idle => write!(f, "Idle"),
            ScanState::ScanScheduled => write!(f, "Scheduled"),
            ScanState::ScanInFlight => write!(f, "Scanning"),
            ScanState::Disabled => write!(f, "Stopped"),
        }
    }
}

/// Identifies one dispatched scan. `epoch` changes whenever scanning is
/// started, stopped or pointed at another adapter, which is how stale
/// completions are recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    pub epoch: u64,
    pub adapter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Apply,
    Discard,
}

#[derive(Debug)]
pub struct ScanScheduler {
    period: Duration,
    enabled: bool,
    started: bool,
    epoch: u64,
    adapter: Option<String>,
    next_tick: Option<Instant>,
    outstanding: Option<ScanTicket>,
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new(SCAN_PERIOD)
    }
}

impl ScanScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            enabled: false,
            started: false,
            epoch: 0,
            adapter: None,
            next_tick: None,
            outstanding: None,
        }
    }

    pub fn state(&self) -> ScanState {
        match (self.enabled, self.outstanding.is_some()) {
            (true, true) => ScanState::ScanInFlight,
            (true, false) => ScanState::ScanScheduled,
            (false, _) if self.started => ScanState::Disabled,
            (false, _) => ScanState::Idle,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    /// Time left until the next tick, while enabled.
    pub fn time_until_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .filter(|_| self.enabled)
            .map(|tick| tick.saturating_duration_since(now))
    }

    /// Start scanning `adapter`: arm the periodic tick and try an immediate
    /// scan. Returns the ticket to dispatch, unless a scan from an earlier
    /// run is still outstanding.
    pub fn enable(&mut self, adapter: String, now: Instant) -> Option<ScanTicket> {
        self.enabled = true;
        self.started = true;
        self.epoch += 1;
        self.adapter = Some(adapter);
        self.next_tick = Some(now + self.period);
        self.launch()
    }

    /// Stop scanning. An outstanding scan keeps running; its completion will
    /// be discarded.
    pub fn disable(&mut self) {
        if self.enabled {
            self.epoch += 1;
        }
        self.enabled = false;
        self.started = true;
        self.next_tick = None;
    }

    /// Point an enabled scheduler at another adapter without resetting the
    /// tick. Results still in flight for the old adapter become stale.
    pub fn retarget(&mut self, adapter: String) {
        if self.adapter.as_deref() == Some(adapter.as_str()) {
            return;
        }
        self.epoch += 1;
        self.adapter = Some(adapter);
    }

    /// Advance the fixed-rate tick. Returns a ticket when a tick fired and no
    /// scan is outstanding; a tick that lands on an in-flight scan is skipped.
    pub fn poll(&mut self, now: Instant) -> Option<ScanTicket> {
        if !self.enabled {
            return None;
        }
        let tick = self.next_tick?;
        if now < tick {
            return None;
        }

        // Skip over ticks missed while the loop was busy rather than firing a
        // burst of them.
        let mut next = tick + self.period;
        while next <= now {
            next += self.period;
        }
        self.next_tick = Some(next);

        if self.outstanding.is_some() {
            tracing::debug!("scan still in flight, skipping tick");
            return None;
        }
        self.launch()
    }

    /// Record that the scan for `ticket` has finished, successfully or not,
    /// and decide whether its result is still wanted.
    pub fn finish(&mut self, ticket: &ScanTicket) -> Disposition {
        if self.outstanding.as_ref() == Some(ticket) {
            self.outstanding = None;
        }

        let current = self.enabled
            && ticket.epoch == self.epoch
            && self.adapter.as_deref() == Some(ticket.adapter.as_str());

        if current {
            Disposition::Apply
        } else {
            tracing::debug!(epoch = ticket.epoch, adapter = %ticket.adapter, "discarding stale scan result");
            Disposition::Discard
        }
    }

    fn launch(&mut self) -> Option<ScanTicket> {
        if self.outstanding.is_some() {
            return None;
        }
        let ticket = ScanTicket {
            epoch: self.epoch,
            adapter: self.adapter.clone()?,
        };
        self.outstanding = Some(ticket.clone());
        Some(ticket)
    }
}

/// Stable sort by signal, strongest first. Equal signals keep scan order.
pub fn sort_by_signal(records: &mut [NetworkRecord]) {
    records.sort_by(|a, b| b.signal_dbm.cmp(&a.signal_dbm));
}

/// Records at or above `threshold_dbm`, order preserved.
pub fn filter_by_threshold(records: &[NetworkRecord], threshold_dbm: i32) -> Vec<NetworkRecord> {
    records
        .iter()
        .filter(|r| r.signal_dbm >= threshold_dbm)
        .cloned()
        .collect()
}
