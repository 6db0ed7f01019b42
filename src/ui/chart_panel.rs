//! # Chart Panel
//!
//! Central interactive plot. Bar charts place one bar per data set label of
//! the selected source; line charts draw one line per source over the sweep
//! value. Error bars are vertical segments of one standard deviation.

use crate::chart::series::{bar_series, line_series};
use crate::chart::{ChartKind, MetricDescriptor, axis_tick_label, axis_x};
use crate::ui::{AppState, color_for_series};
use eframe::egui;
use egui::Color32;
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, PlotUi, Points};
use std::ops::RangeInclusive;

const BAR_WIDTH: f64 = 0.4;
const BAR_COLOR: Color32 = Color32::from_rgb(60, 160, 60);
/// Cap half-width as a fraction of the x span of the plotted points.
const ERROR_BAR_CAP_FRACTION: f64 = 0.01;

/// Render the chart into the remaining central area.
pub fn render(ctx: &egui::Context, state: &AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(descriptor) = state.current_descriptor() else {
            ui.centered_and_justified(|ui| {
                ui.heading("No sections found in the loaded logs");
            });
            return;
        };

        match state.options.kind {
            ChartKind::Bar => render_bar_plot(ui, state, &descriptor),
            ChartKind::Line => render_line_plot(ui, state, &descriptor),
        }
    });
}

fn render_bar_plot(ui: &mut egui::Ui, state: &AppState, descriptor: &MetricDescriptor) {
    let Some(source) = state.sources.get(state.selected_source) else {
        return;
    };
    let series = bar_series(&source.data, descriptor);
    if series.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(format!("No {} data in this source", descriptor.name));
        });
        return;
    }

    let bars: Vec<Bar> = series
        .means
        .iter()
        .zip(&series.labels)
        .enumerate()
        .map(|(idx, (mean, label))| Bar::new(idx as f64, *mean).width(BAR_WIDTH).name(label))
        .collect();
    let chart = BarChart::new(descriptor.title.clone(), bars).color(BAR_COLOR);

    let labels = series.labels.clone();
    let error_color = ui.visuals().strong_text_color();
    Plot::new(("bar_plot", &descriptor.name, state.selected_source))
        .legend(Legend::default())
        .y_axis_label(descriptor.y_label())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let index = mark.value.round();
            if (mark.value - index).abs() < 1e-6 && index >= 0.0 {
                labels.get(index as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            if state.options.error_bars {
                for (idx, (mean, std_dev)) in series.means.iter().zip(&series.std_devs).enumerate() {
                    draw_error_bar(plot_ui, idx as f64, *mean, *std_dev, BAR_WIDTH / 4.0, error_color);
                }
            }
        });
}

fn render_line_plot(ui: &mut egui::Ui, state: &AppState, descriptor: &MetricDescriptor) {
    let lines = line_series(&state.sources, descriptor);
    if lines.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label(format!("No sweep values with {} data", descriptor.name));
        });
        return;
    }

    let log_scale = state.options.log_scale;
    let xs: Vec<f64> = lines.iter().flat_map(|l| l.points.iter().map(|p| axis_x(p.x, log_scale))).collect();
    let cap = cap_half_width(&xs);
    Plot::new(("line_plot", &descriptor.name))
        .legend(Legend::default())
        .x_axis_label(if log_scale { "sweep value (log scale)" } else { "sweep value" })
        .y_axis_label(descriptor.y_label())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| axis_tick_label(mark.value, log_scale))
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for (idx, line) in lines.iter().enumerate() {
                let color = color_for_series(idx);
                let points: Vec<[f64; 2]> = line.points.iter().map(|p| [axis_x(p.x, log_scale), p.mean]).collect();
                plot_ui.line(Line::new(line.tag.clone(), PlotPoints::from(points.clone())).color(color).width(2.0));
                plot_ui.points(Points::new(line.tag.clone(), PlotPoints::from(points)).color(color).radius(3.0));
                if state.options.error_bars {
                    for p in &line.points {
                        draw_error_bar(plot_ui, axis_x(p.x, log_scale), p.mean, p.std_dev, cap, color);
                    }
                }
            }
        });
}

/// Cap half-width for points spread over `xs`.
fn cap_half_width(xs: &[f64]) -> f64 {
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > min { (max - min) * ERROR_BAR_CAP_FRACTION } else { 0.05 }
}

/// Segments of a vertical bar from `mean - std_dev` (floored at zero) to
/// `mean + std_dev` with caps of half-width `cap`. `None` without spread.
fn error_bar_segments(x: f64, mean: f64, std_dev: f64, cap: f64) -> Option<[Vec<[f64; 2]>; 3]> {
    if std_dev <= 0.0 {
        return None;
    }
    let low = (mean - std_dev).max(0.0);
    let high = mean + std_dev;
    Some([
        vec![[x, low], [x, high]],
        vec![[x - cap, low], [x + cap, low]],
        vec![[x - cap, high], [x + cap, high]],
    ])
}

fn draw_error_bar(plot_ui: &mut PlotUi, x: f64, mean: f64, std_dev: f64, cap: f64, color: Color32) {
    let Some(segments) = error_bar_segments(x, mean, std_dev, cap) else {
        return;
    };
    for segment in segments {
        // Unnamed items stay out of the legend
        plot_ui.line(Line::new("", PlotPoints::from(segment)).color(color).width(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_scale_with_the_sweep_range() {
        let cap = cap_half_width(&[64.0, 1024.0, 4096.0]);
        assert!((cap - 40.32).abs() < 1e-9);
        assert_eq!(cap_half_width(&[64.0]), 0.05);

        let [stem, low, high] = error_bar_segments(1024.0, 30.0, 10.0, cap).unwrap();
        assert_eq!(stem, vec![[1024.0, 20.0], [1024.0, 40.0]]);
        assert_eq!(low, vec![[1024.0 - cap, 20.0], [1024.0 + cap, 20.0]]);
        assert_eq!(high[1], [1024.0 + cap, 40.0]);
    }

    #[test]
    fn error_bars_floor_at_zero_and_skip_zero_spread() {
        let [stem, _, _] = error_bar_segments(0.0, 1.0, 5.0, 0.1).unwrap();
        assert_eq!(stem[0], [0.0, 0.0]);
        assert!(error_bar_segments(0.0, 1.0, 0.0, 0.1).is_none());
    }
}
