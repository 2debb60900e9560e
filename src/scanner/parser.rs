//! Text parsers for `iw` output.
//!
//! Every function here is pure and total: malformed input degrades to
//! sentinel values or empty collections, never to an error.

use crate::scanner::{Band, NetworkRecord, DEFAULT_BANDWIDTH_MHZ};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

struct ScanPatterns {
    block_start: Regex,
    bssid: Regex,
    freq: Regex,
    ssid: Regex,
    signal: Regex,
    primary_channel: Regex,
    channel_width: Regex,
}

fn scan_patterns() -> &'static ScanPatterns {
    static PATTERNS: OnceLock<ScanPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static scan pattern");
        ScanPatterns {
            block_start: re(r"(?m)^BSS "),
            bssid: re(r"^(?:BSS )?([0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2}){5})"),
            freq: re(r"freq:[ \t]*(\d+)"),
            ssid: re(r"(?m)^[ \t]*SSID:[ \t]*(.*)$"),
            signal: re(r"signal:[ \t]*(-?\d+)[^\n]*dBm"),
            primary_channel: re(r"primary channel:[ \t]*(\d+)"),
            channel_width: re(r"channel width:[ \t]*(\d+)"),
        }
    })
}

/// Legacy channel-width codes some drivers print in the VHT operation
/// element instead of a width in MHz. Code 0 means "20 or 40 MHz"; the wider
/// option is assumed. Verified only against the drivers it was seen on.
const LEGACY_WIDTH_CODES: &[(u32, u32)] = &[(0, 40), (1, 80)];

fn normalize_bandwidth(raw: u32) -> u32 {
    LEGACY_WIDTH_CODES
        .iter()
        .find(|(code, _)| *code == raw)
        .map(|(_, mhz)| *mhz)
        .unwrap_or(raw)
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse `iw dev <iface> scan` output into one record per `BSS` block, in
/// input order.
pub fn parse_scan_output(output: &str) -> Vec<NetworkRecord> {
    let patterns = scan_patterns();

    patterns
        .block_start
        .split(output)
        .filter(|block| !block.trim().is_empty())
        .map(|block| parse_block(patterns, block))
        .collect()
}

fn parse_block(patterns: &ScanPatterns, block: &str) -> NetworkRecord {
    let mut record = NetworkRecord::default();

    if let Some(mac) = capture(&patterns.bssid, block) {
        record.bssid = mac.to_ascii_lowercase();
    }
    if let Some(freq) = capture(&patterns.freq, block).and_then(|s| s.parse().ok()) {
        record.frequency_mhz = freq;
    }
    if let Some(ssid) = capture(&patterns.ssid, block).map(str::trim)
        && !ssid.is_empty()
    {
        record.ssid = ssid.to_string();
    }
    if let Some(signal) = capture(&patterns.signal, block).and_then(|s| s.parse().ok()) {
        record.signal_dbm = signal;
    }
    record.channel = capture(&patterns.primary_channel, block).and_then(|s| s.parse().ok());
    record.bandwidth_mhz = capture(&patterns.channel_width, block)
        .and_then(|s| s.parse().ok())
        .map(normalize_bandwidth)
        .unwrap_or(DEFAULT_BANDWIDTH_MHZ);

    record
}

/// Adapter names from `iw dev`, in listing order.
pub fn parse_adapter_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("Interface "))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// Radio index from `iw dev <iface> info` (the `wiphy 0` line).
pub fn parse_wiphy(output: &str) -> Option<u32> {
    output
        .lines()
        .find(|line| line.contains("wiphy"))
        .and_then(|line| line.split_whitespace().last())
        .and_then(|id| id.parse().ok())
}

/// Bands with at least one enabled channel in `iw phy <phy> info`.
///
/// Frequency lines look like `* 2412.0 MHz [1] (22.0 dBm)` or
/// `* 5260 MHz [52] (disabled)`; only lines after the first `Band <n>:`
/// header are considered.
pub fn parse_phy_bands(output: &str) -> BTreeSet<Band> {
    static FREQ_LINE: OnceLock<Regex> = OnceLock::new();
    let freq_line =
        FREQ_LINE.get_or_init(|| Regex::new(r"(\d+)(?:\.\d+)?[ \t]*MHz[ \t]*\[").expect("static phy pattern"));

    let mut bands = BTreeSet::new();
    let mut in_band_section = false;

    for line in output.lines().map(str::trim) {
        if line.starts_with("Band ") && line.contains(':') {
            in_band_section = true;
            continue;
        }
        if !in_band_section || !line.contains(']') {
            continue;
        }
        if line.to_ascii_lowercase().contains("disabled") {
            continue;
        }
        if let Some(freq) = capture(freq_line, line).and_then(|s| s.parse::<u32>().ok()) {
            let band = Band::classify(freq);
            if band.is_classified() {
                bands.insert(band);
            }
        }
    }

    bands
}
