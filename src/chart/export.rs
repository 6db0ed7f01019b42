//! SVG chart export with plotters.

use anyhow::{Context, Result, anyhow, bail};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyzer::DataSource;
use crate::common::config::ChartConfig;

use super::metric::MetricDescriptor;
use super::series::{BarSeries, LineSeries as SweepLine, bar_series, line_series};
use super::{ChartKind, ChartOptions, axis_tick_label, axis_x};

const FONT: &str = "sans-serif";
const BAR_HALF_WIDTH: f64 = 0.2;

/// Render one SVG per metric into `dir`.
///
/// Bar charts are drawn per source (the tag becomes part of the file name
/// when there is more than one source); line charts put every source on the
/// same chart. Metrics with no data are skipped.
///
/// # Returns
///
/// Paths of the files written.
pub fn render_all(
    dir: &Path,
    sources: &[DataSource],
    metrics: &[String],
    options: &ChartOptions,
    config: &ChartConfig,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let size = (config.width, config.height);
    let mut written = Vec::new();

    for metric in metrics {
        let descriptor = MetricDescriptor::describe(metric, &config.units);
        match options.kind {
            ChartKind::Bar => {
                for source in sources {
                    let series = bar_series(&source.data, &descriptor);
                    if series.is_empty() {
                        log::info!("No '{}' data in '{}', chart skipped", metric, source.tag);
                        continue;
                    }
                    let tag = (sources.len() > 1).then_some(source.tag.as_str());
                    let path = dir.join(chart_file_name(tag, metric));
                    draw_bar_chart(&path, &series, &descriptor, options, size)?;
                    written.push(path);
                }
            }
            ChartKind::Line => {
                let lines = line_series(sources, &descriptor);
                if lines.is_empty() {
                    log::info!("No sweep points for '{}', chart skipped", metric);
                    continue;
                }
                let path = dir.join(chart_file_name(None, metric));
                draw_line_chart(&path, &lines, &descriptor, options, size)?;
                written.push(path);
            }
        }
    }

    for path in &written {
        log::info!("Wrote {}", path.display());
    }
    Ok(written)
}

/// `Construct` → `construct.svg`, with tag `SGX Driver` → `sgx_driver_construct.svg`.
pub fn chart_file_name(tag: Option<&str>, metric: &str) -> String {
    let stem = match tag {
        Some(tag) => format!("{}_{}", tag, metric),
        None => metric.to_string(),
    };
    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}.svg", sanitized)
}

/// Bar chart with dataset labels as ticks and optional std-dev error bars.
pub fn draw_bar_chart(
    path: &Path,
    series: &BarSeries,
    descriptor: &MetricDescriptor,
    options: &ChartOptions,
    size: (u32, u32),
) -> Result<()> {
    if series.is_empty() {
        bail!("no data for {}", descriptor.name);
    }
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let n = series.len() as f64;
    let y_max = headroom(series.y_max(options.error_bars));
    let mut chart = ChartBuilder::on(&root)
        .caption(&descriptor.title, (FONT, 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..n - 0.5, 0f64..y_max)
        .map_err(draw_err)?;

    let labels = &series.labels;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(series.len())
        .x_label_formatter(&|x: &f64| {
            let index = x.round();
            if (x - index).abs() < 1e-6 && index >= 0.0 {
                labels.get(index as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_desc(descriptor.y_label())
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(series.means.iter().enumerate().map(|(i, mean)| {
            let x = i as f64;
            Rectangle::new([(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, *mean)], GREEN.mix(0.7).filled())
        }))
        .map_err(draw_err)?;

    if options.error_bars {
        chart
            .draw_series(series.means.iter().zip(&series.std_devs).enumerate().map(|(i, (mean, sd))| {
                ErrorBar::new_vertical(i as f64, (mean - sd).max(0.0), *mean, mean + sd, BLACK.filled(), 10)
            }))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Line chart over sweep values, one coloured line per source tag.
pub fn draw_line_chart(
    path: &Path,
    lines: &[SweepLine],
    descriptor: &MetricDescriptor,
    options: &ChartOptions,
    size: (u32, u32),
) -> Result<()> {
    let log_scale = options.log_scale;
    let xs: Vec<f64> = lines.iter().flat_map(|l| l.points.iter().map(|p| axis_x(p.x, log_scale))).collect();
    if xs.is_empty() {
        bail!("no data for {}", descriptor.name);
    }
    let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = if x_max > x_min { (x_max - x_min) * 0.05 } else { 1.0 };
    let y_max = headroom(
        lines
            .iter()
            .flat_map(|l| l.points.iter())
            .map(|p| if options.error_bars { p.mean + p.std_dev } else { p.mean })
            .fold(0.0, f64::max),
    );

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(&descriptor.title, (FONT, 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d((x_min - pad)..(x_max + pad), 0f64..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|x: &f64| axis_tick_label(*x, log_scale))
        .x_desc(if log_scale { "sweep value (log scale)" } else { "sweep value" })
        .y_desc(descriptor.y_label())
        .draw()
        .map_err(draw_err)?;

    for (idx, line) in lines.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points: Vec<(f64, f64)> = line.points.iter().map(|p| (axis_x(p.x, log_scale), p.mean)).collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(draw_err)?
            .label(line.tag.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 3, color.filled())))
            .map_err(draw_err)?;

        if options.error_bars {
            chart
                .draw_series(line.points.iter().map(|p| {
                    let x = axis_x(p.x, log_scale);
                    ErrorBar::new_vertical(x, (p.mean - p.std_dev).max(0.0), p.mean, p.mean + p.std_dev, color.filled(), 8)
                }))
                .map_err(draw_err)?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

fn headroom(y_max: f64) -> f64 {
    if y_max > 0.0 { y_max * 1.1 } else { 1.0 }
}

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("Chart drawing failed: {}", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{DataSet, parse_log_str};
    use crate::common::config::ParserConfig;

    fn source(tag: &str, entries: &[(&str, &str)]) -> DataSource {
        let mut data = DataSet::new();
        for (label, log) in entries {
            data.add(*label, parse_log_str(log, &ParserConfig::default()).unwrap());
        }
        DataSource {
            tag: tag.to_string(),
            data,
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(chart_file_name(None, "Construct"), "construct.svg");
        assert_eq!(chart_file_name(Some("SGX Driver"), "Read/write"), "sgx_driver_read_write.svg");
    }

    #[test]
    fn bar_charts_written_per_metric() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![source(
            "",
            &[
                ("SGX Driver", "-- Read --\n1; 0 s; 100 (ns)\n2; 0 s; 140 (ns)\n"),
                ("Virt SGX", "-- Read --\n1; 0 s; 180 (ns)\n-- Write --\n1; 0 s; 5 (ns)\n"),
            ],
        )];
        let metrics = vec!["Read".to_string(), "Write".to_string(), "Input".to_string()];
        let written = render_all(dir.path(), &sources, &metrics, &ChartOptions::default(), &ChartConfig::default()).unwrap();
        assert_eq!(written, vec![dir.path().join("read.svg"), dir.path().join("write.svg")]);
        let svg = fs::read_to_string(&written[0]).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Read performance"));
    }

    #[test]
    fn line_chart_combines_sources() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![
            source("SGX Driver", &[("64 bytes", "-- Read --\n1; 0 s; 10 (ns)\n"), ("1024 bytes", "-- Read --\n1; 0 s; 30 (ns)\n")]),
            source("Virt SGX", &[("64 bytes", "-- Read --\n1; 0 s; 12 (ns)\n")]),
        ];
        let options = ChartOptions {
            kind: ChartKind::Line,
            error_bars: true,
            log_scale: true,
        };
        let written = render_all(dir.path(), &sources, &["Read".to_string()], &options, &ChartConfig::default()).unwrap();
        assert_eq!(written, vec![dir.path().join("read.svg")]);
        let svg = fs::read_to_string(&written[0]).unwrap();
        assert!(svg.contains("SGX Driver"));
        assert!(svg.contains("Virt SGX"));
    }

    #[test]
    fn empty_series_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = MetricDescriptor::describe("Read", &Default::default());
        let err = draw_bar_chart(&dir.path().join("x.svg"), &BarSeries::default(), &descriptor, &ChartOptions::default(), (400, 300));
        assert!(err.is_err());
    }
}
