//! # Statistics Panel
//!
//! Right side table with the statistics behind the current chart. Values are
//! shown in the display unit of the selected metric.
//!
//! The table uses `egui_extras::TableBuilder`, so large sweeps scroll without
//! rendering every row.

use crate::analyzer::{StatKind, Statistics};
use crate::chart::MetricDescriptor;
use crate::ui::AppState;
use eframe::egui;

/// Statistic columns, left to right.
const TABLE_KINDS: [StatKind; 5] = [StatKind::Mean, StatKind::StdDev, StatKind::Variance, StatKind::Lower, StatKind::Upper];

/// One table row: source tag, data set label and the statistics found.
struct StatsRow<'a> {
    tag: &'a str,
    label: &'a str,
    stats: &'a Statistics,
}

/// Render the right statistics panel.
pub fn render(ctx: &egui::Context, state: &AppState) {
    egui::SidePanel::right("stats_panel")
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| {
            let Some(descriptor) = state.current_descriptor() else {
                ui.centered_and_justified(|ui| {
                    ui.label("No benchmark data loaded");
                });
                return;
            };

            ui.heading(&descriptor.title);
            ui.label(format!("Values in {}", descriptor.unit));
            ui.separator();

            let rows = stats_rows(state, &descriptor.name);
            let show_tag = state.sources.len() > 1;

            use egui_extras::{Column, TableBuilder};

            let row_height = ui.text_style_height(&egui::TextStyle::Body) * 1.3;
            let mut table = TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center));
            if show_tag {
                table = table.column(Column::initial(80.0).at_least(40.0)); // Source
            }
            table
                .column(Column::initial(90.0).at_least(50.0)) // Label
                .columns(Column::initial(60.0).at_least(40.0), TABLE_KINDS.len()) // Statistics
                .column(Column::remainder()) // Samples
                .header(row_height, |mut header| {
                    if show_tag {
                        header.col(|ui| {
                            ui.strong("Source");
                        });
                    }
                    header.col(|ui| {
                        ui.strong("Data set");
                    });
                    for kind in TABLE_KINDS {
                        header.col(|ui| {
                            ui.strong(kind.name());
                        });
                    }
                    header.col(|ui| {
                        ui.strong("Samples");
                    });
                })
                .body(|body| {
                    body.rows(row_height, rows.len(), |mut row| {
                        let entry = &rows[row.index()];
                        if show_tag {
                            row.col(|ui| {
                                ui.label(entry.tag);
                            });
                        }
                        row.col(|ui| {
                            ui.label(entry.label);
                        });
                        for kind in TABLE_KINDS {
                            row.col(|ui| {
                                ui.label(format!("{:.3}", display_value(&descriptor, entry.stats, kind)));
                            });
                        }
                        row.col(|ui| {
                            ui.label(entry.stats.samples.to_string());
                        });
                    });
                });
        });
}

/// Rows for every data set, across all sources, that has `metric`.
fn stats_rows<'a>(state: &'a AppState, metric: &str) -> Vec<StatsRow<'a>> {
    state
        .sources
        .iter()
        .flat_map(|source| {
            source.data.iter().filter_map(move |(label, results)| {
                results.get_test(metric).map(|stats| StatsRow {
                    tag: source.tag.as_str(),
                    label,
                    stats,
                })
            })
        })
        .collect()
}

/// A statistic in the metric's display unit. Variance scales with the
/// square of the unit.
fn display_value(descriptor: &MetricDescriptor, stats: &Statistics, kind: StatKind) -> f64 {
    match kind {
        StatKind::Variance => descriptor.convert(descriptor.convert(stats.variance)),
        other => descriptor.convert(stats.get(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{DataSet, DataSource, parse_log_str};
    use crate::chart::ChartOptions;
    use crate::common::config::{ChartConfig, ParserConfig};

    #[test]
    fn rows_cover_every_source_with_the_metric() {
        let mut driver = DataSet::new();
        driver.add("64 bytes", parse_log_str("-- Construct --\n1; 0 s; 1000000 (ns)\n1; 0 s; 3000000 (ns)\n", &ParserConfig::default()).unwrap());
        driver.add("128 bytes", parse_log_str("-- Read --\n1; 0 s; 5 (ns)\n", &ParserConfig::default()).unwrap());
        let mut virt = DataSet::new();
        virt.add("64 bytes", parse_log_str("-- Construct --\n1; 0 s; 2000000 (ns)\n", &ParserConfig::default()).unwrap());
        let sources = vec![
            DataSource {
                tag: "SGX Driver".to_string(),
                data: driver,
            },
            DataSource {
                tag: "Virt SGX".to_string(),
                data: virt,
            },
        ];
        let state = AppState::new(sources, vec!["Construct".to_string()], ChartConfig::default(), ChartOptions::default(), None);

        let rows = stats_rows(&state, "Construct");
        let keys: Vec<(&str, &str)> = rows.iter().map(|r| (r.tag, r.label)).collect();
        assert_eq!(keys, vec![("SGX Driver", "64 bytes"), ("Virt SGX", "64 bytes")]);

        let descriptor = state.current_descriptor().unwrap();
        assert_eq!(display_value(&descriptor, rows[0].stats, StatKind::Mean), 2.0);
        assert_eq!(display_value(&descriptor, rows[0].stats, StatKind::StdDev), 1.0);
        assert!((display_value(&descriptor, rows[0].stats, StatKind::Variance) - 1.0).abs() < 1e-9);
        assert_eq!(display_value(&descriptor, rows[0].stats, StatKind::Upper), 3.0);
    }
}
