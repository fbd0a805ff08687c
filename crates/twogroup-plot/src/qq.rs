use svg::{Document, Node as _, node::element::Circle};
use twogroup_stats::{StatsError, normality};

use crate::frame::{AXIS_COLOR, Frame, line, padded};

const POINT_FILL: &str = "#4c72b0";
const REFERENCE_COLOR: &str = "#c44e52";

/// Renders a normal Q-Q plot of `values` against a fitted normal
/// distribution, with the 45° reference line.
pub(crate) fn render(
    values: &[f64],
    title: &str,
    width: f64,
    height: f64,
) -> Result<Document, StatsError> {
    let points = normality::qq_points(values)?;

    let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.theoretical).min(p.sample), hi.max(p.theoretical).max(p.sample))
    });
    let domain = padded(lo, hi, 0.05);
    let frame = Frame::new(width, height, domain, domain);

    let mut document = frame.document();
    document.append(frame.title(title));
    let (d0, d1) = frame.x.domain();
    document.append(
        line(
            (frame.x.map(d0), frame.y.map(d0)),
            (frame.x.map(d1), frame.y.map(d1)),
        )
        .set("stroke", REFERENCE_COLOR)
        .set("stroke-width", 1.5),
    );
    for point in &points {
        document.append(
            Circle::new()
                .set("cx", frame.x.map(point.theoretical))
                .set("cy", frame.y.map(point.sample))
                .set("r", 3)
                .set("fill", POINT_FILL)
                .set("stroke", AXIS_COLOR)
                .set("stroke-width", 0.5),
        );
    }
    document.append(frame.numeric_axes("Theoretical Quantiles", "Sample Quantiles"));
    Ok(document)
}
