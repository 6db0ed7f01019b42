//! Extraction of plottable series from aggregated data sets.
//!
//! Both back ends (the egui viewer and the SVG exporter) draw from these
//! structures, so unit conversion and missing-metric handling live here.

use crate::analyzer::metadata::leading_integer;
use crate::analyzer::{DataSet, DataSource, StatKind};

use super::metric::MetricDescriptor;

/// One bar per data set entry that has the metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

impl BarSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Highest bar top including its error bar.
    pub fn y_max(&self, error_bars: bool) -> f64 {
        self.means
            .iter()
            .zip(&self.std_devs)
            .map(|(m, s)| if error_bars { m + s } else { *m })
            .fold(0.0, f64::max)
    }
}

/// A point on a sweep line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePoint {
    pub x: f64,
    pub mean: f64,
    pub std_dev: f64,
}

/// One line per tagged source.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub tag: String,
    pub points: Vec<LinePoint>,
}

/// Means and standard deviations of `descriptor`'s metric across `data`,
/// converted to the display unit. Entries without the metric are skipped.
pub fn bar_series(data: &DataSet, descriptor: &MetricDescriptor) -> BarSeries {
    let means = data.get_test_stats(&descriptor.name, StatKind::Mean);
    let std_devs = data.get_test_stats(&descriptor.name, StatKind::StdDev);

    let mut series = BarSeries::default();
    for ((label, mean), (_, std_dev)) in means.into_iter().zip(std_devs) {
        series.labels.push(label.to_string());
        series.means.push(descriptor.convert(mean));
        series.std_devs.push(descriptor.convert(std_dev));
    }
    series
}

/// One line per source, x taken from the leading integer of each label.
///
/// Labels without a leading integer cannot be placed on a numeric axis and
/// are skipped. Sources left without points are dropped.
pub fn line_series(sources: &[DataSource], descriptor: &MetricDescriptor) -> Vec<LineSeries> {
    sources
        .iter()
        .filter_map(|source| {
            let mut points: Vec<LinePoint> = source
                .data
                .iter()
                .filter_map(|(label, results)| {
                    let x = leading_integer(label)?;
                    let stats = results.get_test(&descriptor.name)?;
                    Some(LinePoint {
                        x: x as f64,
                        mean: descriptor.convert(stats.mean),
                        std_dev: descriptor.convert(stats.std_dev),
                    })
                })
                .collect();
            if points.is_empty() {
                log::debug!("Source '{}' has no points for {}", source.tag, descriptor.name);
                return None;
            }
            points.sort_by(|a, b| a.x.total_cmp(&b.x));
            Some(LineSeries {
                tag: source.tag.clone(),
                points,
            })
        })
        .collect()
}

/// Union of metric names across all sources, in first-seen order.
pub fn available_metrics(sources: &[DataSource]) -> Vec<String> {
    let mut metrics: Vec<String> = Vec::new();
    for source in sources {
        for metric in source.data.metrics() {
            if !metrics.contains(&metric) {
                metrics.push(metric);
            }
        }
    }
    metrics
}
