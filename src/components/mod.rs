mod band_tabs;
mod network_table;
mod spectrum_view;
mod status_bar;

pub use band_tabs::BandTabs;
pub use network_table::NetworkTable;
pub use spectrum_view::SpectrumView;
pub use status_bar::StatusBar;

use crate::app::App;
use ratatui::layout::Rect;
use ratatui::Frame;

pub trait Component {
    fn render(&self, frame: &mut Frame, area: Rect, app: &App);
}
