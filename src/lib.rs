//! Terminal Wi-Fi spectrum visualizer.
//!
//! Scans nearby access points with `iw`, groups them by band and draws each
//! one as a trapezoid over the frequencies it occupies, height by signal.

pub mod app;
pub mod components;
pub mod event;
pub mod logging;
pub mod scanner;
pub mod scheduler;
pub mod session;
pub mod spectrum;
pub mod theme;
pub mod tui;
