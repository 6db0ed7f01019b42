//! Configuration loading for the log analyzer, chart renderer and heap editor.
//!
//! Every field has a default so an empty (or absent) `bench.toml` yields the
//! conventions used by the SGX benchmark harness.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::analyzer::types::TimeUnit;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "bench.toml";

/// Top level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalysisConfig {
    pub parser: ParserConfig,
    pub metadata: MetadataConfig,
    pub batch: BatchConfig,
    pub charts: ChartConfig,
    pub heap: HeapConfig,
}

/// Delimiters and units of the benchmark log format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParserConfig {
    /// Substring marking a section header line, e.g. `-- Read --`.
    pub header_marker: String,
    /// Separator between the fields of a data line.
    pub field_delimiter: char,
    /// Lines containing this substring are ignored inside a section.
    pub trace_marker: String,
    /// Unit of the first timing field when it carries no suffix.
    pub first_field_unit: TimeUnit,
    /// Unit of the second timing field when it carries no suffix.
    pub second_field_unit: TimeUnit,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_marker: "--".to_string(),
            field_delimiter: ';',
            trace_marker: "#".to_string(),
            first_field_unit: TimeUnit::Seconds,
            second_field_unit: TimeUnit::Nanoseconds,
        }
    }
}

/// Where the sweep parameter lives inside a log file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MetadataConfig {
    /// Character that must appear on a metadata line.
    pub delimiter: char,
    /// 0-based whitespace token index holding the value.
    pub value_token: usize,
    /// Number of leading lines searched for the metadata line.
    pub scan_lines: usize,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            delimiter: '|',
            value_token: 4,
            scan_lines: 32,
        }
    }
}

/// Folder batch parsing options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BatchConfig {
    /// Order files by the numeric filename token instead of by name.
    pub sort_by_filename: bool,
    /// 0-based underscore separated token of the file name holding the sweep value.
    pub filename_token: usize,
    /// Files whose sweep value exceeds this bound are skipped.
    pub max_value: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sort_by_filename: true,
            filename_token: 2,
            max_value: None,
        }
    }
}

/// Chart rendering options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChartConfig {
    /// Display unit per metric, overriding the built-in descriptor table.
    pub units: HashMap<String, TimeUnit>,
    /// SVG width in pixels.
    pub width: u32,
    /// SVG height in pixels.
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            units: HashMap::new(),
            width: 800,
            height: 600,
        }
    }
}

/// Enclave configuration file edited by `set-heap`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HeapConfig {
    pub config_path: PathBuf,
    pub element: String,
    pub default_size: String,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("trusted/Enclave.config.xml"),
            element: "HeapMaxSize".to_string(),
            default_size: "0x1000000".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the TOML file
    ///
    /// # Returns
    /// * `Ok(AnalysisConfig)` if the file was successfully loaded and parsed
    /// * `Err(String)` with a descriptive error message otherwise
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Resolve the configuration for this run.
    ///
    /// An explicit path must exist. Without one, `bench.toml` in the working
    /// directory is used when present, otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    log::info!("Using configuration from {}", fallback.display());
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
