//! Type definitions specific to the analyzer module.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::metadata::leading_integer;

/// One timing sample in nanoseconds.
pub type Reading = u64;

/// Time units understood in log fields and used for chart axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "us")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
}

impl TimeUnit {
    /// Nanoseconds in one unit.
    pub fn nanos(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
        }
    }

    /// Convert a nanosecond quantity into this unit.
    pub fn from_nanos(self, nanos: f64) -> f64 {
        nanos / self.nanos() as f64
    }

    /// Short axis label.
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Aggregate over the readings of one section.
///
/// Created once by [`Statistics::from_samples`] and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
    pub variance: f64,
    /// Number of readings that contributed (NaN samples excluded).
    pub samples: usize,
}

/// Selector for a single field of [`Statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Mean,
    Upper,
    Lower,
    StdDev,
    Variance,
}

impl StatKind {
    pub fn name(self) -> &'static str {
        match self {
            StatKind::Mean => "mean",
            StatKind::Upper => "upper",
            StatKind::Lower => "lower",
            StatKind::StdDev => "std dev",
            StatKind::Variance => "variance",
        }
    }
}

impl Statistics {
    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Mean => self.mean,
            StatKind::Upper => self.max,
            StatKind::Lower => self.min,
            StatKind::StdDev => self.std_dev,
            StatKind::Variance => self.variance,
        }
    }
}

/// Statistics per section of one log file, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    sections: IndexMap<String, Statistics>,
}

impl ResultSet {
    pub(crate) fn from_sections(sections: IndexMap<String, Statistics>) -> Self {
        Self { sections }
    }

    /// Statistics of a section, `None` if the log had no such section.
    pub fn get_test(&self, section: &str) -> Option<&Statistics> {
        self.sections.get(section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Result sets keyed by dataset label (system name or sweep value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSet {
    entries: IndexMap<String, ResultSet>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a result set. A label already present keeps its first
    /// result set and `false` is returned.
    pub fn add(&mut self, label: impl Into<String>, results: ResultSet) -> bool {
        let label = label.into();
        if self.entries.contains_key(&label) {
            return false;
        }
        self.entries.insert(label, results);
        true
    }

    pub fn get(&self, label: &str) -> Option<&ResultSet> {
        self.entries.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultSet)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(label, value)` for every entry that has `section`; entries lacking
    /// it are skipped.
    pub fn get_test_stats(&self, section: &str, kind: StatKind) -> Vec<(&str, f64)> {
        self.iter()
            .filter_map(|(label, results)| results.get_test(section).map(|stats| (label, stats.get(kind))))
            .collect()
    }

    /// Union of section names over all entries, in first-seen order.
    pub fn metrics(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for (_, results) in self.iter() {
            for section in results.sections() {
                if !seen.iter().any(|s| s == section) {
                    seen.push(section.to_string());
                }
            }
        }
        seen
    }

    /// Reorder entries by the leading integer of their label. Labels without
    /// one go last; the sort is stable.
    pub fn sort_by_sweep_value(&mut self) {
        self.entries.sort_by(|a, _, b, _| match (leading_integer(a), leading_integer(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }
}

/// A tagged data set, drawn as one line in a line chart.
#[derive(Debug, Clone, Serialize)]
pub struct DataSource {
    pub tag: String,
    pub data: DataSet,
}

/// Error type for log analysis failures.
#[derive(Debug)]
pub enum AnalyzerError {
    FileRead { path: PathBuf, message: String },
    Parse { path: Option<PathBuf>, line: usize, message: String },
    InvalidInput(String),
    DuplicateInput(String),
}

impl std::fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerError::FileRead { path, message } => write!(f, "Failed to read {}: {}", path.display(), message),
            AnalyzerError::Parse { path: Some(path), line, message } => {
                write!(f, "Parse error in {} at line {}: {}", path.display(), line, message)
            }
            AnalyzerError::Parse { path: None, line, message } => write!(f, "Parse error at line {}: {}", line, message),
            AnalyzerError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalyzerError::DuplicateInput(msg) => write!(f, "Duplicate input: {}", msg),
        }
    }
}

impl std::error::Error for AnalyzerError {}
