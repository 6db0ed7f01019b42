//! Metric descriptor table: chart title and display unit per section.

use std::collections::HashMap;

use crate::analyzer::TimeUnit;

/// Built-in descriptors. Enclave construction and destruction take
/// milliseconds, everything else is plotted in nanoseconds.
const METRIC_TABLE: &[(&str, &str, TimeUnit)] = &[
    ("Read", "Read performance", TimeUnit::Nanoseconds),
    ("Write", "Write performance", TimeUnit::Nanoseconds),
    ("Construct", "Construct performance", TimeUnit::Milliseconds),
    ("Destruct", "Destruct performance", TimeUnit::Milliseconds),
    ("Input", "Input performance", TimeUnit::Nanoseconds),
    ("Output", "Output performance", TimeUnit::Nanoseconds),
    ("Encryption", "Encryption performance", TimeUnit::Nanoseconds),
    ("Decryption", "Decryption performance", TimeUnit::Nanoseconds),
];

/// How one metric (section name) is titled and scaled on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub name: String,
    pub title: String,
    pub unit: TimeUnit,
}

impl MetricDescriptor {
    /// Look up `metric` in the table, applying any unit override.
    pub fn describe(metric: &str, overrides: &HashMap<String, TimeUnit>) -> Self {
        let (title, unit) = METRIC_TABLE
            .iter()
            .find(|(name, _, _)| *name == metric)
            .map(|(_, title, unit)| (title.to_string(), *unit))
            .unwrap_or_else(|| (format!("{} performance", metric), TimeUnit::Nanoseconds));

        Self {
            name: metric.to_string(),
            title,
            unit: overrides.get(metric).copied().unwrap_or(unit),
        }
    }

    pub fn y_label(&self) -> String {
        format!("time taken ({})", self.unit)
    }

    /// Convert a nanosecond statistic into the display unit.
    pub fn convert(&self, nanos: f64) -> f64 {
        self.unit.from_nanos(nanos)
    }
}
