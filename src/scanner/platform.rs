use crate::scanner::{
    parse_adapter_list, parse_phy_bands, parse_scan_output, parse_wiphy, Band, NetworkRecord,
    ScanError,
};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::process::Stdio;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::process::Command;

/// Upper bound for a single `iw dev <iface> scan`.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound for `iw dev <iface> info` and `iw phy <phy> info`.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for `iw dev`.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(5);

const DEMO_SCAN_DELAY: Duration = Duration::from_millis(600);
const DEMO_QUERY_DELAY: Duration = Duration::from_millis(150);

/// Where wireless data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Shell out to `iw`.
    #[default]
    System,
    /// Canned `iw` output fed through the same parsers, for running without
    /// wireless hardware or privileges.
    Demo,
}

impl Backend {
    /// Adapter names, or an empty list when the query fails.
    pub async fn list_adapters(self) -> Vec<String> {
        let output = match self {
            Backend::Demo => Ok(DEMO_DEV_LIST.to_string()),
            Backend::System => run_command("iw", &["dev"], LIST_TIMEOUT).await,
        };

        match output {
            Ok(text) => parse_adapter_list(&text),
            Err(e) => {
                tracing::warn!(error = %e, "could not list wireless adapters");
                Vec::new()
            }
        }
    }

    /// Bands the adapter's radio has at least one enabled channel in. Empty
    /// when any query along the way fails.
    pub async fn supported_bands(self, adapter: &str) -> BTreeSet<Band> {
        match self.query_bands(adapter).await {
            Ok(bands) => bands,
            Err(e) => {
                tracing::warn!(adapter, error = %e, "could not read supported bands");
                BTreeSet::new()
            }
        }
    }

    async fn query_bands(self, adapter: &str) -> Result<BTreeSet<Band>, ScanError> {
        let info = match self {
            Backend::Demo if adapter == DEMO_ADAPTER => {
                tokio::time::sleep(DEMO_QUERY_DELAY).await;
                DEMO_DEV_INFO.to_string()
            }
            Backend::Demo => return Ok(BTreeSet::new()),
            Backend::System => run_command("iw", &["dev", adapter, "info"], QUERY_TIMEOUT).await?,
        };

        let Some(wiphy) = parse_wiphy(&info) else {
            tracing::warn!(adapter, "no wiphy line in adapter info");
            return Ok(BTreeSet::new());
        };

        let phy_info = match self {
            Backend::Demo => DEMO_PHY_INFO.to_string(),
            Backend::System => {
                let phy = format!("phy{wiphy}");
                run_command("iw", &["phy", phy.as_str(), "info"], QUERY_TIMEOUT).await?
            }
        };

        Ok(parse_phy_bands(&phy_info))
    }

    /// Run one scan and parse it. Blocks the calling task for up to
    /// [`SCAN_TIMEOUT`].
    pub async fn scan(self, adapter: &str) -> Result<Vec<NetworkRecord>, ScanError> {
        let output = match self {
            Backend::Demo => {
                tokio::time::sleep(DEMO_SCAN_DELAY).await;
                generate_demo_scan(adapter)
            }
            Backend::System => run_command("iw", &["dev", adapter, "scan"], SCAN_TIMEOUT).await?,
        };

        Ok(parse_scan_output(&output))
    }
}

/// Run a command to completion and return its stdout. The child is killed if
/// it outlives `timeout`.
pub(crate) async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ScanError> {
    let command = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ScanError::Spawn {
            command: command.clone(),
            source,
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ScanError::Spawn {
            command: command.clone(),
            source,
        })?,
        Err(_) => return Err(ScanError::TimedOut { command, timeout }),
    };

    if !output.status.success() {
        return Err(ScanError::Failed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

const DEMO_ADAPTER: &str = "wlan0";

const DEMO_DEV_LIST: &str = "\
phy#0
\tInterface wlan0
\t\tifindex 3
\t\twdev 0x1
\t\taddr 02:00:00:00:01:00
\t\ttype managed
";

const DEMO_DEV_INFO: &str = "\
Interface wlan0
\tifindex 3
\twdev 0x1
\taddr 02:00:00:00:01:00
\ttype managed
\twiphy 0
";

const DEMO_PHY_INFO: &str = "\
Wiphy phy0
\tBand 1:
\t\tFrequencies:
\t\t\t* 2412.0 MHz [1] (20.0 dBm)
\t\t\t* 2437.0 MHz [6] (20.0 dBm)
\t\t\t* 2462.0 MHz [11] (20.0 dBm)
\t\t\t* 2484.0 MHz [14] (disabled)
\tBand 2:
\t\tFrequencies:
\t\t\t* 5180.0 MHz [36] (23.0 dBm)
\t\t\t* 5500.0 MHz [100] (23.0 dBm) (radar detection)
\t\t\t* 5745.0 MHz [149] (30.0 dBm)
\tBand 4:
\t\tFrequencies:
\t\t\t* 5955.0 MHz [1] (disabled)
";

/// Simulated `iw dev wlan0 scan` output. Signals jitter a few dB between
/// calls so the display visibly updates.
fn generate_demo_scan(adapter: &str) -> String {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();

    // (bssid, ssid, freq, primary channel, VHT width code, base signal)
    let base_networks: [(&str, &str, u32, u32, Option<u32>, i32); 12] = [
        ("a1:b2:c3:d4:e5:f6", "CoffeeShop_Free", 2437, 6, None, -42),
        ("11:22:33:44:55:66", "Airport_WiFi", 2412, 1, None, -55),
        ("aa:bb:cc:dd:ee:ff", "Starbucks_WiFi", 2462, 11, None, -62),
        ("12:34:56:78:9a:bc", "Hotel_Guest", 2437, 6, None, -48),
        ("de:ad:be:ef:ca:fe", "Library_Public", 5745, 149, Some(1), -58),
        ("fe:ed:fa:ce:00:11", "FastFood_Free", 2442, 7, None, -70),
        ("22:33:44:55:66:77", "Mall_WiFi", 5180, 36, Some(1), -65),
        ("88:99:aa:bb:cc:dd", "Neighbor_5G", 5500, 100, Some(0), -78),
        ("ee:ff:00:11:22:33", "xfinitywifi", 2412, 1, None, -72),
        ("44:55:66:77:88:99", "ATT_WiFi", 5180, 36, Some(0), -80),
        ("00:11:22:33:44:55", "", 2462, 11, None, -85),
        ("66:77:88:99:aa:bb", "Neighbor_6E", 5975, 5, Some(1), -74),
    ];

    let mut output = String::new();
    for (idx, (bssid, ssid, freq, channel, width, base_signal)) in base_networks.into_iter().enumerate() {
        let variance = (seed.wrapping_add(idx as u64 * 7919) % 7) as i32 - 3;
        let _ = writeln!(output, "BSS {bssid}(on {adapter})");
        let _ = writeln!(output, "\tfreq: {freq}.0");
        let _ = writeln!(output, "\tsignal: {}.00 dBm", base_signal + variance);
        let _ = writeln!(output, "\tSSID: {ssid}");
        let _ = writeln!(output, "\tHT operation:");
        let _ = writeln!(output, "\t\t * primary channel: {channel}");
        let _ = writeln!(output, "\t\t * STA channel width: any");
        if let Some(code) = width {
            let _ = writeln!(output, "\tVHT operation:");
            let _ = writeln!(output, "\t\t * channel width: {code}");
        }
    }
    output
}
