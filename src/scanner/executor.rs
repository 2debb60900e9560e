use crate::scanner::{Backend, Band, NetworkRecord, ScanError};
use crate::scheduler::ScanTicket;
use std::collections::BTreeSet;
use tokio::sync::mpsc;

/// Result of one background scan, handed back to the control loop.
#[derive(Debug)]
pub struct ScanCompletion {
    pub ticket: ScanTicket,
    pub outcome: Result<Vec<NetworkRecord>, ScanError>,
}

/// Supported bands of one adapter, as found by a background query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandReport {
    pub adapter: String,
    pub bands: BTreeSet<Band>,
}

/// Runs scans and band queries off the control loop and queues their
/// results.
///
/// The executor itself does not limit concurrency; the scheduler only hands
/// out a ticket when no scan is outstanding.
pub struct ScanExecutor {
    backend: Backend,
    tx: mpsc::UnboundedSender<ScanCompletion>,
    rx: mpsc::UnboundedReceiver<ScanCompletion>,
    bands_tx: mpsc::UnboundedSender<BandReport>,
    bands_rx: mpsc::UnboundedReceiver<BandReport>,
}

impl ScanExecutor {
    pub fn new(backend: Backend) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (bands_tx, bands_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            tx,
            rx,
            bands_tx,
            bands_rx,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Start a scan for `ticket` on its own task. Must be called from within
    /// a tokio runtime.
    pub fn dispatch(&self, ticket: ScanTicket) {
        let backend = self.backend;
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = backend.scan(&ticket.adapter).await;
            if let Err(ref e) = outcome {
                tracing::warn!(adapter = %ticket.adapter, error = %e, "scan failed");
            }
            // The receiver lives as long as the executor; a send error only
            // happens during shutdown.
            let _ = tx.send(ScanCompletion { ticket, outcome });
        });
    }

    /// Next finished scan, if any, without waiting.
    pub fn try_next(&mut self) -> Option<ScanCompletion> {
        self.rx.try_recv().ok()
    }

    /// Look up `adapter`'s supported bands on its own task. The two `iw`
    /// queries behind it can take up to 20 s together.
    pub fn query_bands(&self, adapter: String) {
        let backend = self.backend;
        let tx = self.bands_tx.clone();

        tokio::spawn(async move {
            let bands = backend.supported_bands(&adapter).await;
            let _ = tx.send(BandReport { adapter, bands });
        });
    }

    /// Next finished band query, if any, without waiting.
    pub fn try_next_bands(&mut self) -> Option<BandReport> {
        self.bands_rx.try_recv().ok()
    }
}
