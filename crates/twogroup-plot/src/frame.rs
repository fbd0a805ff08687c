//! Plot frame: data-to-pixel scales, axes and labels.

use svg::{
    Document, Node,
    node::element::{Group, Line, Rectangle, Text},
};

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TICK_LENGTH: f64 = 5.0;
const TARGET_TICKS: f64 = 5.0;
const MAX_TICKS: u32 = 50;
/// Domains narrower than this fraction of their magnitude are widened.
const MIN_RELATIVE_SPAN: f64 = 1e-12;
const FONT: &str = "sans-serif";
pub(crate) const AXIS_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#dddddd";

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl Scale {
    /// Creates a scale.
    ///
    /// A domain without visible spread is widened by half a unit on each
    /// side, or by 5% of its magnitude when that is larger.
    pub(crate) fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (lo, hi) = domain;
        let magnitude = lo.abs().max(hi.abs());
        let domain = if hi - lo > (magnitude * MIN_RELATIVE_SPAN).max(f64::EPSILON) {
            domain
        } else {
            let half = (magnitude * 0.05).max(0.5);
            (lo - half, hi + half)
        };
        Self { domain, range }
    }

    pub(crate) fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub(crate) fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Pixel length of a data length.
    pub(crate) fn length(&self, value: f64) -> f64 {
        (self.map(value) - self.map(0.0)).abs()
    }

    /// Evenly spaced tick positions at a "nice" step inside the domain.
    pub(crate) fn ticks(&self) -> Vec<f64> {
        let (lo, hi) = self.domain;
        let step = nice_step((hi - lo) / TARGET_TICKS);
        if !(step.is_finite() && step > 0.0) {
            return vec![];
        }
        let first = (lo / step).ceil();
        (0..MAX_TICKS)
            .map(|i| (first + f64::from(i)) * step)
            .take_while(|tick| *tick <= hi + step * 1e-9)
            .collect()
    }
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10_f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = match fraction {
        f if f <= 1.0 => 1.0,
        f if f <= 2.0 => 2.0,
        f if f <= 5.0 => 5.0,
        _ => 10.0,
    };
    nice * magnitude
}

/// Formats a tick label with as few decimals as the value needs.
pub(crate) fn format_tick(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_owned() } else { text.to_owned() }
}

/// Pads a data interval by `fraction` of its width on both sides.
pub(crate) fn padded(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let pad = (max - min).abs() * fraction;
    (min - pad, max + pad)
}

/// A rectangular plot area inside a document of fixed size.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) x: Scale,
    pub(crate) y: Scale,
}

impl Frame {
    pub(crate) fn new(width: f64, height: f64, x_domain: (f64, f64), y_domain: (f64, f64)) -> Self {
        let x = Scale::new(x_domain, (MARGIN_LEFT, width - MARGIN_RIGHT));
        let y = Scale::new(y_domain, (height - MARGIN_BOTTOM, MARGIN_TOP));
        Self {
            width,
            height,
            x,
            y,
        }
    }

    fn left(&self) -> f64 {
        MARGIN_LEFT
    }

    fn right(&self) -> f64 {
        self.width - MARGIN_RIGHT
    }

    fn top(&self) -> f64 {
        MARGIN_TOP
    }

    fn bottom(&self) -> f64 {
        self.height - MARGIN_BOTTOM
    }

    /// Empty document with a white background.
    pub(crate) fn document(&self) -> Document {
        Document::new()
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", format!("0 0 {} {}", self.width, self.height))
            .add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", "white"),
            )
    }

    pub(crate) fn title(&self, title: &str) -> Text {
        text(title)
            .set("x", (self.left() + self.right()) / 2.0)
            .set("y", self.top() / 2.0 + 6.0)
            .set("text-anchor", "middle")
            .set("font-size", 16)
    }

    /// Axis lines with numeric ticks on both axes.
    pub(crate) fn numeric_axes(&self, x_label: &str, y_label: &str) -> Group {
        let mut group = self.axis_lines();
        for tick in self.x.ticks() {
            let x = self.x.map(tick);
            group.append(self.x_tick(x, &format_tick(tick)));
        }
        self.add_y_ticks(&mut group);
        self.add_labels(&mut group, x_label, y_label);
        group
    }

    /// Axis lines with named ticks at x = 0, 1, ... and numeric y ticks.
    pub(crate) fn category_axes(&self, categories: &[&str], y_label: &str) -> Group {
        let mut group = self.axis_lines();
        for (i, label) in (0_u32..).zip(categories) {
            let x = self.x.map(f64::from(i));
            group.append(self.x_tick(x, label));
        }
        self.add_y_ticks(&mut group);
        self.add_labels(&mut group, "", y_label);
        group
    }

    /// Horizontal grid lines at the y ticks.
    pub(crate) fn grid(&self) -> Group {
        let mut group = Group::new()
            .set("stroke", GRID_COLOR)
            .set("stroke-width", 1);
        for tick in self.y.ticks() {
            let y = self.y.map(tick);
            group.append(line((self.left(), y), (self.right(), y)));
        }
        group
    }

    fn axis_lines(&self) -> Group {
        Group::new()
            .set("stroke", AXIS_COLOR)
            .set("font-family", FONT)
            .set("font-size", 12)
            .add(line((self.left(), self.bottom()), (self.right(), self.bottom())))
            .add(line((self.left(), self.bottom()), (self.left(), self.top())))
    }

    fn x_tick(&self, x: f64, label: &str) -> Group {
        let bottom = self.bottom();
        Group::new()
            .add(line((x, bottom), (x, bottom + TICK_LENGTH)))
            .add(
                text(label)
                    .set("x", x)
                    .set("y", bottom + TICK_LENGTH + 14.0)
                    .set("text-anchor", "middle")
                    .set("stroke", "none"),
            )
    }

    fn add_y_ticks(&self, group: &mut Group) {
        let left = self.left();
        for tick in self.y.ticks() {
            let y = self.y.map(tick);
            group.append(line((left - TICK_LENGTH, y), (left, y)));
            group.append(
                text(&format_tick(tick))
                    .set("x", left - TICK_LENGTH - 3.0)
                    .set("y", y + 4.0)
                    .set("text-anchor", "end")
                    .set("stroke", "none"),
            );
        }
    }

    fn add_labels(&self, group: &mut Group, x_label: &str, y_label: &str) {
        if !x_label.is_empty() {
            group.append(
                text(x_label)
                    .set("x", (self.left() + self.right()) / 2.0)
                    .set("y", self.height - 15.0)
                    .set("text-anchor", "middle")
                    .set("stroke", "none"),
            );
        }
        if !y_label.is_empty() {
            let x = 18.0;
            let y = (self.top() + self.bottom()) / 2.0;
            group.append(
                text(y_label)
                    .set("x", x)
                    .set("y", y)
                    .set("text-anchor", "middle")
                    .set("transform", format!("rotate(-90 {x} {y})"))
                    .set("stroke", "none"),
            );
        }
    }
}

pub(crate) fn line(from: (f64, f64), to: (f64, f64)) -> Line {
    Line::new()
        .set("x1", from.0)
        .set("y1", from.1)
        .set("x2", to.0)
        .set("y2", to.1)
}

pub(crate) fn text(content: &str) -> Text {
    Text::new(content).set("font-family", FONT)
}
