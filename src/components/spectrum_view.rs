use crate::app::App;
use crate::components::Component;
use crate::session::{TabSet, UNAVAILABLE_MESSAGE};
use crate::spectrum::{
    LayoutConfig, Point, RenderPlan, SpectrumPlan, Trapezoid, BACKGROUND, EMPTY_PLACEHOLDER, FILL_ALPHA,
    FOREGROUND,
};
use crate::theme::Theme;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// Braille canvas with one dot per layout pixel.
pub struct SpectrumView;

impl Component for SpectrumView {
    fn render(&self, frame: &mut Frame, area: Rect, app: &App) {
        let session = &app.session;
        let title = format!(" Spectrum (threshold {} dBm) ", session.threshold_dbm());
        let block = Block::default()
            .borders(Borders::ALL)
            .style(Theme::border_style())
            .title(Span::styled(title, Theme::title_style()));

        let inner = block.inner(area);
        let placeholder = match session.tabs() {
            TabSet::NoDevice => Some(Line::styled("Press d to select a wireless device", Theme::help_style())),
            TabSet::Unavailable => Some(Line::styled(UNAVAILABLE_MESSAGE, Theme::error_style())),
            TabSet::Bands(_) => None,
        };
        if let Some(line) = placeholder {
            render_message(frame, area, block, line);
            return;
        }

        // Braille packs 2x4 dots into each cell.
        let width = u32::from(inner.width) * 2;
        let height = u32::from(inner.height) * 4;
        let plan = session
            .spectrum_frame(width, height)
            .layout(&LayoutConfig::compact());

        match plan {
            RenderPlan::Empty { .. } => {
                render_message(frame, area, block, Line::styled(EMPTY_PLACEHOLDER, Theme::help_style()));
            }
            RenderPlan::Spectrum(plan) => {
                let canvas = Canvas::default()
                    .block(block)
                    .marker(Marker::Braille)
                    .background_color(Theme::color(BACKGROUND))
                    .x_bounds([0.0, f64::from(plan.width)])
                    .y_bounds([0.0, f64::from(plan.height)])
                    .paint(|ctx| paint(ctx, &plan));
                frame.render_widget(canvas, area);
            }
        }
    }
}

fn render_message(frame: &mut Frame, area: Rect, block: Block, line: Line<'static>) {
    // Push the message to the vertical middle of the block.
    let padding = area.height.saturating_sub(2) / 2;
    let mut lines = vec![Line::from(""); padding as usize];
    lines.push(line);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn paint(ctx: &mut Context, plan: &SpectrumPlan) {
    let fg = Theme::color(FOREGROUND);
    let height = f64::from(plan.height);
    let flip = |p: Point| (f64::from(p.x), height - f64::from(p.y));

    // Fills go in their own layer so outlines drawn later stay visible.
    for trapezoid in plan.trapezoids.iter().filter(|t| t.filled) {
        let color = Theme::color(trapezoid.color.blend_over(BACKGROUND, FILL_ALPHA));
        for (y, left, right) in fill_rows(trapezoid) {
            ctx.draw(&CanvasLine::new(left, height - y, right, height - y, color));
        }
    }
    ctx.layer();

    let ruler = &plan.ruler;
    let baseline = height - f64::from(ruler.baseline_y);
    ctx.draw(&CanvasLine::new(f64::from(ruler.left), baseline, f64::from(ruler.right), baseline, fg));

    for tick in &plan.ticks {
        let x = f64::from(tick.x);
        ctx.draw(&CanvasLine::new(x, height - f64::from(tick.top_y), x, height - f64::from(tick.bottom_y), fg));
    }

    for trapezoid in &plan.trapezoids {
        let color = Theme::color(trapezoid.color);
        let corners = [
            trapezoid.bottom_left,
            trapezoid.top_left,
            trapezoid.top_right,
            trapezoid.bottom_right,
        ];
        for pair in corners.windows(2) {
            let (x1, y1) = flip(pair[0]);
            let (x2, y2) = flip(pair[1]);
            ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
        }
    }
    ctx.layer();

    for tick in &plan.ticks {
        let x = centered_text_x(tick.x, tick.label.chars().count());
        ctx.print(x, height - f64::from(tick.label_y), Line::styled(tick.label.clone(), Style::default().fg(fg)));
    }

    for trapezoid in &plan.trapezoids {
        if let Some(label) = &trapezoid.label {
            let x = centered_text_x(label.center_x, label.text.chars().count());
            // Label y is the top of a 4-dot text row; aim for its middle.
            let y = height - f64::from(label.y) - 2.0;
            let style = Style::default().fg(Theme::color(trapezoid.color)).bg(Color::Reset);
            ctx.print(x, y, Line::styled(label.text.clone(), style));
        }
    }
}

/// Left edge for `chars` characters of text centered on dot column `center`.
fn centered_text_x(center: i32, chars: usize) -> f64 {
    let half_width = chars as f64; // 2 dots per character
    (f64::from(center) - half_width).max(0.0)
}

/// Horizontal spans `(y, left, right)` covering the trapezoid, one per dot
/// row from the baseline up to the top edge, in layout coordinates.
fn fill_rows(trapezoid: &Trapezoid) -> Vec<(f64, f64, f64)> {
    let bottom = trapezoid.bottom_left.y;
    let top = trapezoid.top_left.y;
    let height = f64::from((bottom - top).max(1));

    (top..=bottom)
        .map(|y| {
            let t = f64::from(bottom - y) / height;
            let lerp = |from: i32, to: i32| f64::from(from) + f64::from(to - from) * t;
            (
                f64::from(y),
                lerp(trapezoid.bottom_left.x, trapezoid.top_left.x),
                lerp(trapezoid.bottom_right.x, trapezoid.top_right.x),
            )
        })
        .collect()
}
