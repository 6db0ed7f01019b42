// Interactive chart viewer
//
// This module organizes the UI into separate components:
// - `top_panel`: Metric selection and chart switches
// - `stats_panel`: Statistics table for the current metric
// - `chart_panel`: Central plot drawn with egui_plot
// - `app_state`: Application state management and main update loop

pub mod app_state;
pub mod chart_panel;
pub mod stats_panel;
pub mod top_panel;

use crate::analyzer::DataSource;
use crate::chart::ChartOptions;
use crate::common::config::ChartConfig;
use eframe::egui;

pub use app_state::{AppState, color_for_series};

/// Open the viewer window and block until it is closed.
pub fn run_viewer(sources: Vec<DataSource>, metrics: Vec<String>, chart_config: ChartConfig, options: ChartOptions) -> anyhow::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SGX Benchmark Charts",
        native_options,
        Box::new(move |cc| Ok(Box::new(AppState::new(sources, metrics, chart_config, options, cc.storage)))),
    )
    .map_err(|e| anyhow::anyhow!("Chart viewer failed: {}", e))
}
