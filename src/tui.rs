use color_eyre::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::ops::{Deref, DerefMut};
use std::panic;

pub type Backend = CrosstermBackend<Stdout>;

/// Terminal in raw mode on the alternate screen. Restores the screen when
/// dropped, including on early returns through `?`.
pub struct Tui {
    terminal: Terminal<Backend>,
}

impl Tui {
    pub fn init() -> Result<Self> {
        install_panic_hook();
        execute!(io::stdout(), EnterAlternateScreen)?;
        enable_raw_mode()?;

        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.hide_cursor()?;
        Ok(Self { terminal })
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = restore() {
            tracing::error!(error = %e, "failed to restore terminal");
        }
        let _ = self.terminal.show_cursor();
    }
}

/// Leave the alternate screen before a panic report is printed, otherwise it
/// is lost with the screen.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
