//! Grouped boxplot with a jittered strip of the observations.

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use svg::{
    Document, Node as _,
    node::element::{Circle, Group, Rectangle},
};
use twogroup_analysis::dataset::{Dataset, GroupPair};
use twogroup_stats::percentiles::Percentiles;

use crate::frame::{AXIS_COLOR, Frame, line, padded, text};

/// Fill colours of the first and second group.
const PALETTE: [&str; 2] = ["#7b9fd4", "#d88b8d"];
/// Horizontal offset of each group's box from the parameter slot centre.
const DODGE: f64 = 0.2;
const BOX_WIDTH: f64 = 0.35;

/// Layout and sampling options of [`boxplot`](crate::boxplot()).
#[derive(Debug, Clone, PartialEq)]
pub struct BoxplotOptions {
    pub width: f64,
    pub height: f64,
    /// Percentiles at which the whiskers end.
    pub whiskers: (f64, f64),
    /// Half-width of the strip jitter, in parameter slots.
    pub jitter: f64,
    /// Seed of the jitter, for reproducible output.
    pub seed: u64,
    pub y_label: String,
}

impl Default for BoxplotOptions {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 800.0,
            whiskers: (2.5, 97.5),
            jitter: 0.08,
            seed: 0,
            y_label: "Parameter value".to_owned(),
        }
    }
}

/// Five-number summary drawn as one box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    /// Observations beyond the whiskers, ascending.
    pub fliers: Vec<f64>,
}

/// Summarizes the finite values of a sample, or returns `None` if there are
/// none.
///
/// The whiskers reach the most extreme observations within the `whiskers`
/// percentiles. Observations beyond them are fliers.
///
/// ```
/// use twogroup_plot::boxplot::summarize;
///
/// let values = (0..=40).map(f64::from).collect::<Vec<_>>();
/// let summary = summarize(&values, (2.5, 97.5)).unwrap();
/// assert_eq!((summary.q1, summary.median, summary.q3), (10.0, 20.0, 30.0));
/// assert_eq!((summary.whisker_low, summary.whisker_high), (1.0, 39.0));
/// assert_eq!(summary.fliers, vec![0.0, 40.0]);
/// ```
#[must_use]
pub fn summarize(values: &[f64], whiskers: (f64, f64)) -> Option<BoxSummary> {
    let mut sorted = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let (low, high) = whiskers;
    let p = Percentiles::from_sorted(&sorted, &[low, 25.0, 50.0, 75.0, high]);
    // Whiskers end at the most extreme observation inside the percentiles
    let (low_limit, high_limit) = (p.get(low)?, p.get(high)?);
    let whisker_low = sorted
        .iter()
        .copied()
        .find(|v| *v >= low_limit)
        .unwrap_or(low_limit);
    let whisker_high = sorted
        .iter()
        .copied()
        .rfind(|v| *v <= high_limit)
        .unwrap_or(high_limit);
    let fliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < whisker_low || *v > whisker_high)
        .collect();
    Some(BoxSummary {
        whisker_low,
        q1: p.get(25.0)?,
        median: p.get(50.0)?,
        q3: p.get(75.0)?,
        whisker_high,
        fliers,
    })
}

struct Series {
    /// Box centre on the x axis.
    center: f64,
    group: usize,
    values: Vec<f64>,
    summary: Option<BoxSummary>,
}

/// Renders the boxes of `parameters`, dodged by the two groups.
///
/// Returns `None` if none of the selected groups has a finite value.
pub(crate) fn render(
    dataset: &Dataset,
    parameters: &[&str],
    groups: &GroupPair,
    options: &BoxplotOptions,
) -> Option<Document> {
    let mut series = vec![];
    for (slot, parameter) in (0_u32..).zip(parameters) {
        for (group, category) in groups.labels().into_iter().enumerate() {
            let values = dataset
                .sample(parameter, category)
                .into_iter()
                .filter(|v| v.is_finite())
                .collect::<Vec<_>>();
            let summary = summarize(&values, options.whiskers);
            let offset = if group == 0 { -DODGE } else { DODGE };
            series.push(Series {
                center: f64::from(slot) + offset,
                group,
                values,
                summary,
            });
        }
    }

    let (lo, hi) = series
        .iter()
        .flat_map(|s| &s.values)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(*v), hi.max(*v))),
            None => Some((*v, *v)),
        })?;
    let x_domain = (-0.5, f64::from(u32::try_from(parameters.len()).ok()?) - 0.5);
    let frame = Frame::new(options.width, options.height, x_domain, padded(lo, hi, 0.05));

    let mut document = frame.document();
    document.append(frame.grid());
    for s in &series {
        if let Some(summary) = &s.summary {
            document.append(draw_box(&frame, s.center, summary, PALETTE[s.group]));
        }
    }

    let mut rng = Pcg64::seed_from_u64(options.seed);
    let mut strip = Group::new()
        .set("fill", AXIS_COLOR)
        .set("fill-opacity", 0.6);
    for s in &series {
        for value in &s.values {
            let jitter = rng.random_range(-options.jitter..=options.jitter);
            strip.append(
                Circle::new()
                    .set("cx", frame.x.map(s.center + jitter))
                    .set("cy", frame.y.map(*value))
                    .set("r", 2),
            );
        }
    }
    document.append(strip);

    document.append(frame.category_axes(parameters, &options.y_label));
    document.append(legend(&frame, groups));
    Some(document)
}

fn draw_box(frame: &Frame, center: f64, summary: &BoxSummary, fill: &str) -> Group {
    let half = frame.x.length(BOX_WIDTH) / 2.0;
    let cx = frame.x.map(center);
    let top = frame.y.map(summary.q3);
    let bottom = frame.y.map(summary.q1);
    let median = frame.y.map(summary.median);
    let high = frame.y.map(summary.whisker_high);
    let low = frame.y.map(summary.whisker_low);
    let cap = half / 2.0;

    let mut group = Group::new()
        .set("stroke", AXIS_COLOR)
        .set("stroke-width", 1.2)
        .add(line((cx, high), (cx, top)))
        .add(line((cx, bottom), (cx, low)))
        .add(line((cx - cap, high), (cx + cap, high)))
        .add(line((cx - cap, low), (cx + cap, low)))
        .add(
            Rectangle::new()
                .set("x", cx - half)
                .set("y", top)
                .set("width", 2.0 * half)
                .set("height", bottom - top)
                .set("fill", fill),
        )
        .add(line((cx - half, median), (cx + half, median)).set("stroke-width", 2));
    for flier in &summary.fliers {
        group.append(
            Circle::new()
                .set("cx", cx)
                .set("cy", frame.y.map(*flier))
                .set("r", 4)
                .set("fill", "none"),
        );
    }
    group
}

fn legend(frame: &Frame, groups: &GroupPair) -> Group {
    let x = frame.width - 150.0;
    let mut group = Group::new().set("font-size", 12);
    for ((label, color), y) in groups.labels().into_iter().zip(PALETTE).zip([50.0, 70.0]) {
        group.append(
            Rectangle::new()
                .set("x", x)
                .set("y", y - 10.0)
                .set("width", 12)
                .set("height", 12)
                .set("fill", color)
                .set("stroke", AXIS_COLOR),
        );
        group.append(text(label).set("x", x + 18.0).set("y", y));
    }
    group
}

#[cfg(test)]
mod tests {
    use twogroup_analysis::dataset::Observation;

    use super::*;

    fn dataset() -> Dataset {
        let mut observations = vec![];
        for i in 0..20 {
            let v = f64::from(i);
            observations.push(Observation::new(Some(v), "weight", "healthy"));
            observations.push(Observation::new(Some(v * 2.0), "weight", "diseased"));
            observations.push(Observation::new(Some(v + 100.0), "height", "healthy"));
        }
        observations.push(Observation::new(None, "height", "diseased"));
        Dataset::new(observations)
    }

    #[test]
    fn test_summary_without_values() {
        assert!(summarize(&[], (2.5, 97.5)).is_none());
        assert!(summarize(&[f64::NAN], (2.5, 97.5)).is_none());
    }

    #[test]
    fn test_summary_of_single_value() {
        let summary = summarize(&[7.0], (2.5, 97.5)).unwrap();
        assert_eq!(summary.q1, 7.0);
        assert_eq!(summary.whisker_high, 7.0);
        assert!(summary.fliers.is_empty());
    }

    #[test]
    fn test_whiskers_end_at_observations() {
        let summary = summarize(&[10.0, 3.0, 1.0, 4.0, 2.0], (10.0, 90.0)).unwrap();
        assert_eq!((summary.q1, summary.median, summary.q3), (2.0, 3.0, 4.0));
        // The 10th and 90th percentiles are 1.4 and 7.6
        assert_eq!((summary.whisker_low, summary.whisker_high), (2.0, 4.0));
        assert_eq!(summary.fliers, vec![1.0, 10.0]);
    }

    #[test]
    fn test_render_draws_every_observation() {
        let groups = GroupPair::new("healthy", "diseased");
        let svg = render(&dataset(), &["weight", "height"], &groups, &BoxplotOptions::default())
            .unwrap()
            .to_string();
        assert!(svg.contains("Parameter value"));
        assert!(svg.contains("height"));
        // Three boxes, two legend swatches and the background
        assert_eq!(svg.matches("<rect").count(), 6);
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        let groups = GroupPair::new("healthy", "diseased");
        let options = BoxplotOptions::default();
        let render_with = |options: &BoxplotOptions| {
            render(&dataset(), &["weight"], &groups, options)
                .unwrap()
                .to_string()
        };
        assert_eq!(render_with(&options), render_with(&options));
        let reseeded = BoxplotOptions {
            seed: 7,
            ..options.clone()
        };
        assert_ne!(render_with(&options), render_with(&reseeded));
    }

    #[test]
    fn test_render_without_values() {
        let groups = GroupPair::new("healthy", "diseased");
        let dataset = Dataset::new(vec![Observation::new(None, "weight", "healthy")]);
        assert!(render(&dataset, &["weight"], &groups, &BoxplotOptions::default()).is_none());
    }
}
