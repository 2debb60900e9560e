//! Run one scan outside the TUI and print what the parser made of it.

use clap::Parser;
use color_eyre::Result;
use wifi_spectrum::scanner::{Backend, NetworkRecord};
use wifi_spectrum::scheduler::sort_by_signal;

#[derive(Parser, Debug)]
#[command(name = "scan-once", about = "List adapters and bands, then scan once")]
struct Args {
    /// Use simulated `iw` output
    #[arg(short, long)]
    demo: bool,

    /// Adapter to scan; defaults to the first one found
    adapter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let backend = if args.demo { Backend::Demo } else { Backend::System };

    let adapters = backend.list_adapters().await;
    println!("Adapters: {}", if adapters.is_empty() { "(none)".to_string() } else { adapters.join(", ") });

    let Some(adapter) = args.adapter.or_else(|| adapters.first().cloned()) else {
        println!("No wireless adapter to scan.");
        return Ok(());
    };

    let bands = backend.supported_bands(&adapter).await;
    let bands: Vec<String> = bands.iter().map(ToString::to_string).collect();
    println!("Bands on {adapter}: {}", if bands.is_empty() { "unknown".to_string() } else { bands.join(", ") });

    println!("Scanning {adapter}...\n");
    let mut records = backend.scan(&adapter).await?;
    sort_by_signal(&mut records);

    println!("Found {} networks:\n", records.len());
    println!(
        "{:<19} {:<32} {:>7} {:>9} {:>9} {:>8}  Band",
        "BSSID", "SSID", "Channel", "Freq", "Width", "Signal"
    );
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &NetworkRecord) {
    println!(
        "{:<19} {:<32} {:>7} {:>5} MHz {:>5} MHz {:>4} dBm  {}",
        record.bssid,
        record.ssid,
        record.channel_label(),
        record.frequency_mhz,
        record.bandwidth_mhz,
        record.signal_dbm,
        record.band(),
    );
}
