use clap::Parser;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;
use wifi_spectrum::app::App;
use wifi_spectrum::event::{Event, EventHandler};
use wifi_spectrum::logging;
use wifi_spectrum::scanner::Backend;
use wifi_spectrum::tui::Tui;

#[derive(Parser, Debug)]
#[command(name = "wifi-spectrum")]
#[command(version)]
#[command(about = "Draw the Wi-Fi spectrum around you in the terminal")]
struct Args {
    /// Run with simulated `iw` output instead of real hardware
    #[arg(short, long)]
    demo: bool,

    /// Append logs to this file instead of the default in the temp directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let log_path = args.log_file.unwrap_or_else(logging::default_log_path);
    logging::init_tracing(&log_path)?;

    let backend = if args.demo { Backend::Demo } else { Backend::System };
    let mut app = App::new(backend).await;

    let mut terminal = Tui::init()?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    loop {
        terminal.draw(|frame| app.render(frame))?;

        match events.next().await? {
            Event::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    app.quit();
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    KeyCode::Char(' ') | KeyCode::Enter => app.toggle_scanning(),
                    KeyCode::Char('d') => app.cycle_device(),
                    KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_tab(),
                    KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.previous_tab(),
                    KeyCode::Up | KeyCode::Char('k') => app.navigate_up(),
                    KeyCode::Down | KeyCode::Char('j') => app.navigate_down(),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.raise_threshold(false),
                    KeyCode::Char('-') => app.lower_threshold(false),
                    KeyCode::PageUp => app.raise_threshold(true),
                    KeyCode::PageDown => app.lower_threshold(true),
                    KeyCode::Char('?') => app.toggle_help(),
                    _ => {}
                }
            }
            Event::Tick => app.on_tick(),
            Event::Resize(_, _) => {
                // Picked up by the next draw
            }
        }

        if app.should_quit {
            break;
        }
    }

    tracing::info!("exiting");
    Ok(())
}
