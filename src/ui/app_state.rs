//! # Application State Management
//!
//! This module implements the central `AppState` struct holding the parsed
//! data sources and the chart switches chosen by the user. It implements the
//! `eframe::App` trait to integrate with the egui application framework.
//!
//! The interface is immediate mode: every frame the panels read the state,
//! render, and write back whatever the user changed.

use eframe::egui;
use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::analyzer::DataSource;
use crate::chart::export::{chart_file_name, draw_bar_chart, draw_line_chart};
use crate::chart::series::{bar_series, line_series};
use crate::chart::{ChartKind, ChartOptions, MetricDescriptor};
use crate::common::config::ChartConfig;

/// Line colours, cycled per source tag.
const SERIES_COLORS: [Color32; 6] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
];

/// Colour for the `index`-th source.
pub fn color_for_series(index: usize) -> Color32 {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Central application state for the chart viewer.
pub struct AppState {
    /// Optional alert message to display in a modal dialog.
    pub alert: Option<String>,
    /// Parsed data, one entry per `--dataset` group or `--source` folder.
    pub sources: Vec<DataSource>,
    /// Every metric present in at least one source.
    pub metrics: Vec<String>,
    /// Index into `metrics`.
    pub selected_metric: usize,
    /// Source shown by bar charts.
    pub selected_source: usize,
    pub options: ChartOptions,
    pub chart_config: ChartConfig,
    /// Last directory used by the "Save SVG" dialog.
    pub last_save_dir: Option<String>,
}

/// Settings persisted across application sessions.
#[derive(Default, Serialize, Deserialize)]
struct PersistedSettings {
    last_save_dir: Option<String>,
}

impl AppState {
    /// Create a new AppState, loading persisted settings if available.
    ///
    /// # Parameters
    ///
    /// * `sources` - Parsed data sources to chart
    /// * `metrics` - Metrics offered in the selector, in display order
    /// * `chart_config` - Unit overrides and export size
    /// * `options` - Initial chart switches from the command line
    /// * `storage` - Optional persistent storage for loading saved settings
    pub fn new(
        sources: Vec<DataSource>,
        metrics: Vec<String>,
        chart_config: ChartConfig,
        options: ChartOptions,
        storage: Option<&dyn eframe::Storage>,
    ) -> Self {
        let persisted: PersistedSettings = storage.and_then(|s| eframe::get_value(s, "app_settings")).unwrap_or_default();

        Self {
            alert: None,
            sources,
            metrics,
            selected_metric: 0,
            selected_source: 0,
            options,
            chart_config,
            last_save_dir: persisted.last_save_dir,
        }
    }

    /// Name of the metric currently charted, `None` when nothing was parsed.
    pub fn current_metric(&self) -> Option<&str> {
        self.metrics.get(self.selected_metric).map(String::as_str)
    }

    pub fn current_descriptor(&self) -> Option<MetricDescriptor> {
        self.current_metric().map(|m| MetricDescriptor::describe(m, &self.chart_config.units))
    }

    /// Ask for a target file and write the current chart as SVG.
    pub fn save_current_chart(&mut self) {
        let Some(descriptor) = self.current_descriptor() else {
            return;
        };
        let mut dialog = rfd::FileDialog::new()
            .add_filter("SVG image", &["svg"])
            .set_file_name(chart_file_name(None, &descriptor.name));
        if let Some(dir) = &self.last_save_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };
        if let Some(parent) = path.parent() {
            self.last_save_dir = Some(parent.to_string_lossy().to_string());
        }

        let size = (self.chart_config.width, self.chart_config.height);
        let result = match self.options.kind {
            ChartKind::Bar => match self.sources.get(self.selected_source) {
                Some(source) => draw_bar_chart(&path, &bar_series(&source.data, &descriptor), &descriptor, &self.options, size),
                None => Err(anyhow::anyhow!("no data source selected")),
            },
            ChartKind::Line => draw_line_chart(&path, &line_series(&self.sources, &descriptor), &descriptor, &self.options, size),
        };
        match result {
            Ok(()) => log::info!("Saved chart to {}", path.display()),
            Err(e) => {
                log::error!("Failed to save chart to {}: {}", path.display(), e);
                self.alert = Some(format!("Failed to save chart: {}", e));
            }
        }
    }
}

impl eframe::App for AppState {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            last_save_dir: self.last_save_dir.clone(),
        };
        eframe::set_value(storage, "app_settings", &settings);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(alert) = self.alert.clone() {
            egui::Window::new("Alert")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.label(alert);
                        ui.add_space(20.0);

                        if ui.button("OK").clicked() {
                            self.alert = None;
                        }
                        ui.add_space(10.0);
                    });
                });
        }

        // Panels layout: top (controls), right (statistics), chart fills the rest
        super::top_panel::render(ctx, self);
        super::stats_panel::render(ctx, self);
        super::chart_panel::render(ctx, self);
    }
}
