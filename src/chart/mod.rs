//! Chart rendering for aggregated benchmark data.
//!
//! - `metric`: descriptor table (title, unit) per section name
//! - `series`: bar and line series extraction shared by both back ends
//! - `export`: SVG rendering with plotters
//!
//! The interactive back end lives in `crate::ui`.

pub mod export;
pub mod metric;
pub mod series;

pub use metric::MetricDescriptor;

/// Chart layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartKind {
    /// Index positions on x, one bar per data set entry.
    #[default]
    Bar,
    /// Numeric x from the sweep value, one line per source.
    Line,
}

/// Rendering switches common to the viewer and the exporter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub kind: ChartKind,
    pub error_bars: bool,
    pub log_scale: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            kind: ChartKind::Bar,
            error_bars: true,
            log_scale: false,
        }
    }
}

/// Position of `x` on the chart axis.
pub fn axis_x(x: f64, log_scale: bool) -> f64 {
    if log_scale { x.max(f64::MIN_POSITIVE).log10() } else { x }
}

/// Axis tick text for an axis position.
pub fn axis_tick_label(position: f64, log_scale: bool) -> String {
    if log_scale {
        format!("{:.0}", 10f64.powf(position))
    } else {
        format!("{:.0}", position)
    }
}
