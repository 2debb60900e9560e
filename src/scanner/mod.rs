mod error;
mod executor;
mod parser;
mod platform;

pub use error::ScanError;
pub use executor::{BandReport, ScanCompletion, ScanExecutor};
pub use parser::{parse_adapter_list, parse_phy_bands, parse_scan_output, parse_wiphy};
pub use platform::{Backend, LIST_TIMEOUT, QUERY_TIMEOUT, SCAN_TIMEOUT};

use std::fmt;

/// BSSID used when a block carries no recognizable MAC address.
pub const UNKNOWN_BSSID: &str = "?";
/// SSID used when the scan output has no (or an empty) SSID line.
pub const HIDDEN_SSID: &str = "(hidden)";
pub const DEFAULT_BANDWIDTH_MHZ: u32 = 20;
/// Treated as "weakest possible" when the signal line is missing.
pub const WEAKEST_SIGNAL_DBM: i32 = -130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    Band2_4GHz,
    Band5GHz,
    Band6GHz,
    Unclassified,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Band2_4GHz => write!(f, "2.4 GHz"),
            Band::Band5GHz => write!(f, "5 GHz"),
            Band::Band6GHz => write!(f, "6 GHz"),
            Band::Unclassified => write!(f, "Unclassified"),
        }
    }
}

impl Band {
    /// Map a center frequency to its band. Total: anything outside the three
    /// Wi-Fi ranges is `Unclassified`.
    pub fn classify(frequency_mhz: u32) -> Self {
        match frequency_mhz {
            2400..=2500 => Band::Band2_4GHz,
            5000..=5999 => Band::Band5GHz,
            6000..=7000 => Band::Band6GHz,
            _ => Band::Unclassified,
        }
    }

    pub fn is_classified(self) -> bool {
        self != Band::Unclassified
    }
}

/// One access point as reported by a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRecord {
    pub bssid: String,
    pub ssid: String,
    pub channel: Option<u32>,
    pub frequency_mhz: u32,
    pub bandwidth_mhz: u32,
    pub signal_dbm: i32,
}

impl Default for NetworkRecord {
    fn default() -> Self {
        Self {
            bssid: UNKNOWN_BSSID.to_string(),
            ssid: HIDDEN_SSID.to_string(),
            channel: None,
            frequency_mhz: 0,
            bandwidth_mhz: DEFAULT_BANDWIDTH_MHZ,
            signal_dbm: WEAKEST_SIGNAL_DBM,
        }
    }
}

impl NetworkRecord {
    pub fn band(&self) -> Band {
        Band::classify(self.frequency_mhz)
    }

    pub fn is_hidden(&self) -> bool {
        self.ssid == HIDDEN_SSID
    }

    pub fn channel_label(&self) -> String {
        self.channel
            .map(|c| c.to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    /// Occupied range `[f - bw/2, f + bw/2]` in MHz.
    pub fn frequency_range(&self) -> (f64, f64) {
        let center = f64::from(self.frequency_mhz);
        let half = f64::from(self.bandwidth_mhz) / 2.0;
        (center - half, center + half)
    }
}
