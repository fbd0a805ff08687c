use svg::{Document, Node as _, node::element::Rectangle};
use twogroup_stats::histogram::{DEFAULT_NUM_BINS, Histogram};

use crate::frame::{Frame, padded};

const BAR_FILL: &str = "#4c72b0";

/// Renders a frequency histogram of `values` with equal-width bins.
///
/// Returns `None` if `values` holds no finite value.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn render(values: &[f64], title: &str, width: f64, height: f64) -> Option<Document> {
    let histogram = Histogram::new(values.iter().copied(), DEFAULT_NUM_BINS);
    let first = histogram.bins.first()?;
    let last = histogram.bins.last()?;

    let x_domain = padded(first.range.start, last.range.end, 0.05);
    let y_max = (histogram.max_count() as f64 * 1.05).max(1.0);
    let frame = Frame::new(width, height, x_domain, (0.0, y_max));

    let mut document = frame.document();
    document.append(frame.title(title));
    for bin in &histogram.bins {
        let x0 = frame.x.map(bin.range.start);
        let x1 = frame.x.map(bin.range.end);
        let y = frame.y.map(bin.count as f64);
        document.append(
            Rectangle::new()
                .set("x", x0)
                .set("y", y)
                .set("width", x1 - x0)
                .set("height", frame.y.map(0.0) - y)
                .set("fill", BAR_FILL)
                .set("stroke", "white"),
        );
    }
    document.append(frame.numeric_axes("Value", "Frequency"));
    Some(document)
}
