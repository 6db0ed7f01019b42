//! # Top Panel - Chart Controls
//!
//! Metric selection, chart kind, error bars, log scale, the source shown by
//! bar charts and the SVG export button.

use crate::chart::ChartKind;
use crate::ui::AppState;
use eframe::egui;

/// Render the top control bar.
///
/// # Parameters
///
/// * `ctx` - egui context
/// * `state` - Mutable application state updated by the controls
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("chart_controls").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Metric:");
            let selected_text = state.current_metric().unwrap_or("-").to_string();
            egui::ComboBox::from_id_salt("metric_selector")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (idx, metric) in state.metrics.iter().enumerate() {
                        ui.selectable_value(&mut state.selected_metric, idx, metric.as_str());
                    }
                });

            ui.separator();
            ui.selectable_value(&mut state.options.kind, ChartKind::Bar, "Bar");
            ui.selectable_value(&mut state.options.kind, ChartKind::Line, "Line");

            ui.separator();
            ui.checkbox(&mut state.options.error_bars, "Error bars");
            ui.add_enabled(
                state.options.kind == ChartKind::Line,
                egui::Checkbox::new(&mut state.options.log_scale, "Log scale"),
            );

            // Bar charts show a single source
            if state.options.kind == ChartKind::Bar && state.sources.len() > 1 {
                ui.separator();
                ui.label("Source:");
                let selected_tag = state.sources.get(state.selected_source).map(|s| s.tag.clone()).unwrap_or_default();
                egui::ComboBox::from_id_salt("source_selector")
                    .selected_text(selected_tag)
                    .show_ui(ui, |ui| {
                        for (idx, source) in state.sources.iter().enumerate() {
                            ui.selectable_value(&mut state.selected_source, idx, source.tag.as_str());
                        }
                    });
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let can_save = state.current_metric().is_some();
                if ui.add_enabled(can_save, egui::Button::new("Save SVG…")).clicked() {
                    state.save_current_chart();
                }
            });
        });
        ui.add_space(4.0);
    });
}
