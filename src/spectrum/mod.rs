//! Spectrum geometry.
//!
//! Turns a band's sorted, filtered networks into pixel coordinates on a
//! horizontal frequency ruler. The result is a [`RenderPlan`] that any
//! backend can draw; nothing here knows about terminals.
//!
//! Coordinates are integer pixels with the origin in the top-left corner and
//! `y` growing downwards.

mod palette;

pub use palette::{network_color, Rgb, BACKGROUND, FILL_ALPHA, FOREGROUND, NETWORK_PALETTE};

use crate::scanner::{Band, NetworkRecord};
use std::collections::HashSet;

/// Fixed distances of the spectrum drawing, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Space kept free left and right of the ruler.
    pub ruler_margin: i32,
    /// Distance of the ruler baseline from the bottom edge.
    pub ruler_bottom_offset: i32,
    pub tick_half_height: i32,
    /// Distance of tick labels below the baseline.
    pub tick_label_offset: i32,
    /// Height of one line of label text.
    pub label_height: i32,
    pub label_gap: i32,
    /// SSID labels never go above this.
    pub label_min_y: i32,
    /// Vertical space reserved for the ruler and its labels.
    pub ruler_label_space: i32,
    /// Fraction of a trapezoid's width its top edge is inset on each side.
    pub top_inset_fraction: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ruler_margin: 25,
            ruler_bottom_offset: 40,
            tick_half_height: 10,
            tick_label_offset: 25,
            label_height: 17,
            label_gap: 5,
            label_min_y: 5,
            ruler_label_space: 50,
            top_inset_fraction: 0.1,
        }
    }
}

impl LayoutConfig {
    /// Distances for a braille-dot canvas, where a text row is 4 dots tall
    /// and a column 2 dots wide.
    pub fn compact() -> Self {
        Self {
            ruler_margin: 6,
            ruler_bottom_offset: 8,
            tick_half_height: 2,
            tick_label_offset: 6,
            label_height: 4,
            label_gap: 1,
            label_min_y: 0,
            ruler_label_space: 10,
            top_inset_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ruler {
    pub left: i32,
    pub right: i32,
    pub baseline_y: i32,
    pub min_freq_mhz: f64,
    pub max_freq_mhz: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub frequency_mhz: u32,
    pub x: i32,
    pub top_y: i32,
    pub bottom_y: i32,
    /// Vertical center of the frequency label.
    pub label_y: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub center_x: i32,
    /// Top of the text line.
    pub y: i32,
}

/// One network's shape. The outline is the two slanted sides and the top
/// edge; the bottom edge lies on the ruler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trapezoid {
    pub bssid: String,
    /// Position in the signal-descending order the plan was built from.
    pub rank: usize,
    pub color: Rgb,
    pub bottom_left: Point,
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    /// Selected networks get a translucent fill under the outline.
    pub filled: bool,
    /// `None` for hidden networks.
    pub label: Option<Label>,
}

impl Trapezoid {
    pub fn height(&self) -> i32 {
        self.bottom_left.y - self.top_left.y
    }

    pub fn width(&self) -> i32 {
        self.bottom_right.x - self.bottom_left.x
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumPlan {
    pub width: u32,
    pub height: u32,
    pub ruler: Ruler,
    pub ticks: Vec<Tick>,
    /// In draw order: weakest first, so stronger networks end up on top.
    pub trapezoids: Vec<Trapezoid>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderPlan {
    /// Nothing to draw; the renderer shows a placeholder.
    Empty { width: u32, height: u32 },
    Spectrum(SpectrumPlan),
}

pub const EMPTY_PLACEHOLDER: &str = "List is empty";

/// Everything one redraw of the spectrum depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    pub band: Option<Band>,
    /// Sorted by signal, strongest first, already filtered by threshold.
    pub records: Vec<NetworkRecord>,
    pub selected_bssid: Option<String>,
    pub width: u32,
    pub height: u32,
    pub threshold_dbm: i32,
}

impl SpectrumFrame {
    pub fn layout(&self, config: &LayoutConfig) -> RenderPlan {
        layout_with(
            config,
            &self.records,
            self.selected_bssid.as_deref(),
            self.threshold_dbm,
            self.width,
            self.height,
        )
    }
}

/// [`layout_with`] using [`LayoutConfig::default`].
pub fn layout(
    records: &[NetworkRecord],
    selected_bssid: Option<&str>,
    threshold_dbm: i32,
    width: u32,
    height: u32,
) -> RenderPlan {
    layout_with(&LayoutConfig::default(), records, selected_bssid, threshold_dbm, width, height)
}

/// Compute the spectrum geometry for `records`, which are expected in
/// signal-descending order. Pure: equal inputs give equal plans.
pub fn layout_with(
    config: &LayoutConfig,
    records: &[NetworkRecord],
    selected_bssid: Option<&str>,
    threshold_dbm: i32,
    width: u32,
    height: u32,
) -> RenderPlan {
    if records.is_empty() {
        return RenderPlan::Empty { width, height };
    }

    let view_width = i32::try_from(width).unwrap_or(i32::MAX);
    let view_height = i32::try_from(height).unwrap_or(i32::MAX);

    let (min_freq, max_freq) = records
        .iter()
        .map(NetworkRecord::frequency_range)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (left, right)| {
            (lo.min(left), hi.max(right))
        });

    let ruler_left = config.ruler_margin;
    let ruler_right = (view_width - config.ruler_margin).max(ruler_left);
    let scale = FrequencyScale {
        min: min_freq,
        max: max_freq,
        left: ruler_left,
        width: ruler_right - ruler_left,
    };
    let baseline_y = view_height - config.ruler_bottom_offset;

    let mut seen = HashSet::new();
    let ticks = records
        .iter()
        .filter(|r| seen.insert(r.frequency_mhz))
        .map(|r| {
            let x = scale.x(f64::from(r.frequency_mhz));
            Tick {
                frequency_mhz: r.frequency_mhz,
                x,
                top_y: baseline_y - config.tick_half_height,
                bottom_y: baseline_y + config.tick_half_height,
                label_y: baseline_y + config.tick_label_offset,
                label: r.frequency_mhz.to_string(),
            }
        })
        .collect();

    let heights = HeightScale {
        threshold: threshold_dbm,
        max_signal: records.iter().map(|r| r.signal_dbm).max().unwrap_or(threshold_dbm),
        max_height: (view_height - config.label_height - config.ruler_label_space).max(1),
    };

    let trapezoids = records
        .iter()
        .enumerate()
        .rev()
        .map(|(rank, record)| {
            let (left_freq, right_freq) = record.frequency_range();
            let left = scale.x(left_freq);
            let right = scale.x(right_freq);
            let shape_width = (right - left).max(1);
            let inset = (f64::from(shape_width) * config.top_inset_fraction) as i32;
            let top_y = baseline_y - heights.height(record.signal_dbm);

            let label = (!record.is_hidden()).then(|| Label {
                text: record.ssid.clone(),
                center_x: left + (right - left) / 2,
                y: (top_y - config.label_height - config.label_gap).max(config.label_min_y),
            });

            Trapezoid {
                bssid: record.bssid.clone(),
                rank,
                color: network_color(rank),
                bottom_left: Point::new(left, baseline_y),
                top_left: Point::new(left + inset, top_y),
                top_right: Point::new(right - inset, top_y),
                bottom_right: Point::new(right, baseline_y),
                filled: selected_bssid.is_some_and(|s| s == record.bssid),
                label,
            }
        })
        .collect();

    RenderPlan::Spectrum(SpectrumPlan {
        width,
        height,
        ruler: Ruler {
            left: ruler_left,
            right: ruler_right,
            baseline_y,
            min_freq_mhz: min_freq,
            max_freq_mhz: max_freq,
        },
        ticks,
        trapezoids,
    })
}

struct FrequencyScale {
    min: f64,
    max: f64,
    left: i32,
    width: i32,
}

impl FrequencyScale {
    /// Pixel column of `freq`. A zero-width span collapses onto the middle
    /// of the ruler.
    fn x(&self, freq: f64) -> i32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return self.left + self.width / 2;
        }
        self.left + ((freq - self.min) / span * f64::from(self.width)) as i32
    }
}

struct HeightScale {
    threshold: i32,
    max_signal: i32,
    max_height: i32,
}

impl HeightScale {
    /// Trapezoid height for `signal`, never below 1 px.
    fn height(&self, signal: i32) -> i32 {
        let range = i64::from(self.max_signal) - i64::from(self.threshold);
        if range <= 0 {
            return 1;
        }
        let above = i64::from(signal) - i64::from(self.threshold);
        let h = (above as f64 / range as f64 * f64::from(self.max_height)) as i32;
        h.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::HIDDEN_SSID;

    fn network(bssid: &str, ssid: &str, freq: u32, bw: u32, signal: i32) -> NetworkRecord {
        NetworkRecord {
            bssid: bssid.to_string(),
            ssid: ssid.to_string(),
            channel: None,
            frequency_mhz: freq,
            bandwidth_mhz: bw,
            signal_dbm: signal,
        }
    }

    fn spectrum(plan: RenderPlan) -> SpectrumPlan {
        match plan {
            RenderPlan::Spectrum(plan) => plan,
            RenderPlan::Empty { .. } => panic!("expected a spectrum plan"),
        }
    }

    fn two_networks() -> Vec<NetworkRecord> {
        vec![
            network("aa:aa:aa:aa:aa:aa", "Strong", 2412, 20, -40),
            network("bb:bb:bb:bb:bb:bb", "Weak", 2437, 20, -60),
        ]
    }

    #[test]
    fn test_empty_records_give_placeholder() {
        assert_eq!(layout(&[], None, -130, 800, 300), RenderPlan::Empty { width: 800, height: 300 });
    }

    #[test]
    fn test_two_network_geometry() {
        let plan = spectrum(layout(&two_networks(), None, -100, 1050, 300));

        assert_eq!(plan.ruler.left, 25);
        assert_eq!(plan.ruler.right, 1025);
        assert_eq!(plan.ruler.baseline_y, 260);
        assert_eq!(plan.ruler.min_freq_mhz, 2402.0);
        assert_eq!(plan.ruler.max_freq_mhz, 2447.0);

        let tick_xs: Vec<_> = plan.ticks.iter().map(|t| (t.label.as_str(), t.x)).collect();
        assert_eq!(tick_xs, [("2412", 247), ("2437", 802)]);
        assert_eq!(plan.ticks[0].top_y, 250);
        assert_eq!(plan.ticks[0].bottom_y, 270);
        assert_eq!(plan.ticks[0].label_y, 285);

        // Drawn weakest first.
        let weak = &plan.trapezoids[0];
        let strong = &plan.trapezoids[1];
        assert_eq!(weak.bssid, "bb:bb:bb:bb:bb:bb");
        assert_eq!(strong.bssid, "aa:aa:aa:aa:aa:aa");

        assert_eq!(strong.bottom_left, Point::new(25, 260));
        assert_eq!(strong.bottom_right, Point::new(469, 260));
        assert_eq!(strong.top_left, Point::new(69, 27));
        assert_eq!(strong.top_right, Point::new(425, 27));
        assert_eq!(strong.height(), 233);

        assert_eq!(weak.bottom_left.x, 580);
        assert_eq!(weak.bottom_right.x, 1025);
        assert_eq!(weak.height(), 155);

        let label = strong.label.as_ref().unwrap();
        assert_eq!(label.text, "Strong");
        assert_eq!(label.center_x, 247);
        assert_eq!(label.y, 5);
    }

    #[test]
    fn test_colors_follow_rank_not_draw_order() {
        let records: Vec<_> = (0..31)
            .map(|i| network(&format!("{i:02}"), "n", 2412 + i as u32, 20, -30 - i as i32))
            .collect();
        let plan = spectrum(layout(&records, None, -130, 1600, 300));

        assert_eq!(plan.trapezoids.len(), 31);
        assert_eq!(plan.trapezoids.first().unwrap().rank, 30);
        assert_eq!(plan.trapezoids.last().unwrap().rank, 0);
        for trapezoid in &plan.trapezoids {
            assert_eq!(trapezoid.color, NETWORK_PALETTE[trapezoid.rank % 30]);
        }
        assert_eq!(plan.trapezoids[0].color, NETWORK_PALETTE[0]);
    }

    #[test]
    fn test_duplicate_frequencies_share_one_tick() {
        let records = vec![
            network("01", "A", 2437, 20, -40),
            network("02", "B", 2437, 40, -50),
            network("03", "C", 2412, 20, -60),
        ];
        let plan = spectrum(layout(&records, None, -130, 800, 300));
        let labels: Vec<_> = plan.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["2437", "2412"]);
    }

    #[test]
    fn test_hidden_ssid_has_no_label() {
        let records = vec![
            network("01", HIDDEN_SSID, 2437, 20, -40),
            network("02", "Visible", 2412, 20, -50),
        ];
        let plan = spectrum(layout(&records, None, -130, 800, 300));
        let hidden = plan.trapezoids.iter().find(|t| t.bssid == "01").unwrap();
        let visible = plan.trapezoids.iter().find(|t| t.bssid == "02").unwrap();
        assert!(hidden.label.is_none());
        assert_eq!(visible.label.as_ref().unwrap().text, "Visible");
        assert!(plan.trapezoids.iter().all(|t| t.label.as_ref().is_none_or(|l| l.text != HIDDEN_SSID)));
    }

    #[test]
    fn test_selection_fills_only_matching_network() {
        let records = two_networks();
        let plan = spectrum(layout(&records, Some("bb:bb:bb:bb:bb:bb"), -100, 800, 300));
        let filled: Vec<_> = plan.trapezoids.iter().filter(|t| t.filled).map(|t| t.bssid.as_str()).collect();
        assert_eq!(filled, ["bb:bb:bb:bb:bb:bb"]);

        let stale = spectrum(layout(&records, Some("cc:cc:cc:cc:cc:cc"), -100, 800, 300));
        assert!(stale.trapezoids.iter().all(|t| !t.filled));
    }

    #[test]
    fn test_single_network_spans_ruler() {
        let records = vec![network("01", "Solo", 5180, 80, -55)];
        let plan = spectrum(layout(&records, None, -130, 400, 200));
        let solo = &plan.trapezoids[0];
        assert_eq!(solo.bottom_left.x, plan.ruler.left);
        assert_eq!(solo.bottom_right.x, plan.ruler.right);
        assert_eq!(plan.ticks[0].x, plan.ruler.left + (plan.ruler.right - plan.ruler.left) / 2);
        assert_eq!(solo.height(), 200 - 17 - 50);
    }

    #[test]
    fn test_zero_span_maps_to_midpoint() {
        let records = vec![
            network("01", "A", 2437, 0, -40),
            network("02", "B", 2437, 0, -70),
        ];
        let plan = spectrum(layout(&records, None, -130, 500, 200));
        let mid = 25 + (475 - 25) / 2;
        assert_eq!(plan.ticks.len(), 1);
        assert_eq!(plan.ticks[0].x, mid);
        for trapezoid in &plan.trapezoids {
            assert_eq!(trapezoid.bottom_left.x, mid);
            assert_eq!(trapezoid.bottom_right.x, mid);
            assert_eq!(trapezoid.top_left.x, mid);
            assert!(trapezoid.height() >= 1);
        }
    }

    #[test]
    fn test_threshold_at_or_above_max_signal_gives_minimum_height() {
        let records = two_networks();
        for threshold in [-40, -20, 20] {
            let plan = spectrum(layout(&records, None, threshold, 800, 300));
            assert!(plan.trapezoids.iter().all(|t| t.height() == 1), "threshold {threshold}");
        }
    }

    #[test]
    fn test_signal_at_threshold_gets_one_pixel() {
        let records = two_networks();
        let plan = spectrum(layout(&records, None, -60, 800, 300));
        let weak = plan.trapezoids.iter().find(|t| t.bssid == "bb:bb:bb:bb:bb:bb").unwrap();
        assert_eq!(weak.height(), 1);
    }

    #[test]
    fn test_tiny_viewport_stays_finite() {
        let records = two_networks();
        let plan = spectrum(layout(&records, Some("aa:aa:aa:aa:aa:aa"), -130, 10, 5));
        assert_eq!(plan.ruler.left, plan.ruler.right);
        for trapezoid in &plan.trapezoids {
            assert!(trapezoid.height() >= 1);
            assert!(trapezoid.width() >= 0);
        }
    }

    #[test]
    fn test_huge_viewport_does_not_overflow() {
        let records = two_networks();
        let plan = spectrum(layout(&records, Some("aa:aa:aa:aa:aa:aa"), -100, u32::MAX, u32::MAX));

        assert_eq!(plan.ruler.right, i32::MAX - 25);
        for trapezoid in &plan.trapezoids {
            let label = trapezoid.label.as_ref().unwrap();
            assert!(label.center_x >= trapezoid.bottom_left.x);
            assert!(label.center_x <= trapezoid.bottom_right.x);
            assert!(trapezoid.height() >= 1);
        }
        let weak = plan.trapezoids.iter().find(|t| t.bssid == "bb:bb:bb:bb:bb:bb").unwrap();
        assert_eq!(weak.bottom_right.x, plan.ruler.right);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let records = vec![
            network("01", "A", 5180, 80, -50),
            network("02", HIDDEN_SSID, 5200, 20, -60),
            network("03", "C", 5500, 40, -75),
        ];
        let frame = SpectrumFrame {
            band: Some(Band::Band5GHz),
            records,
            selected_bssid: Some("02".to_string()),
            width: 640,
            height: 240,
            threshold_dbm: -90,
        };
        let config = LayoutConfig::compact();
        assert_eq!(frame.layout(&config), frame.layout(&config));
        assert_eq!(frame.layout(&LayoutConfig::default()), frame.layout(&LayoutConfig::default()));
    }

    #[test]
    fn test_top_edge_inset_is_ten_percent() {
        let records = vec![network("01", "A", 2437, 20, -40)];
        let plan = spectrum(layout(&records, None, -130, 250, 300));
        let t = &plan.trapezoids[0];
        assert_eq!(t.width(), 200);
        assert_eq!(t.top_left.x - t.bottom_left.x, 20);
        assert_eq!(t.bottom_right.x - t.top_right.x, 20);
    }
}
