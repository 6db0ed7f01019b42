//! Sweep parameter extraction from metadata lines and file names.
//!
//! Benchmark runs that sweep a payload size or iteration count print a framed
//! metadata line near the top of the log:
//!
//! ```text
//! | Data len = 1024 |
//! | Count = 500 |
//! ```

use std::io::BufRead;

use crate::common::config::MetadataConfig;

use super::log_loader::LogLoader;

/// Numeric configuration value varied across a batch of log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SweepParameter {
    #[default]
    DataLen,
    DataSize,
    Count,
}

impl SweepParameter {
    /// Phrase identifying the metadata line.
    pub fn keyword(self) -> &'static str {
        match self {
            SweepParameter::DataLen => "Data len",
            SweepParameter::DataSize => "Data size",
            SweepParameter::Count => "Count",
        }
    }

    pub fn unit_label(self) -> &'static str {
        match self {
            SweepParameter::DataLen | SweepParameter::DataSize => "bytes",
            SweepParameter::Count => "iterations",
        }
    }

    /// Dataset label for a sweep value, e.g. `"1024 bytes"`.
    pub fn label_for(self, value: u64) -> String {
        format!("{} {}", value, self.unit_label())
    }

    /// Extract the value from a metadata line.
    ///
    /// # Returns
    ///
    /// `Some(value)` if the line carries the delimiter and keyword and the
    /// configured token is an integer, `None` otherwise.
    pub fn extract(self, line: &str, config: &MetadataConfig) -> Option<u64> {
        if !line.contains(config.delimiter) || !line.contains(self.keyword()) {
            return None;
        }
        line.split_whitespace().nth(config.value_token)?.parse().ok()
    }
}

/// Payload length from a `Data len` metadata line, using the default layout.
#[cfg(test)]
pub fn get_data_len(line: &str) -> Option<u64> {
    SweepParameter::DataLen.extract(line, &MetadataConfig::default())
}

/// Scan the first `scan_lines` lines of a log for the sweep value.
pub fn read_sweep_value<R: BufRead>(
    loader: &mut LogLoader<R>,
    parameter: SweepParameter,
    config: &MetadataConfig,
) -> Result<Option<u64>, std::io::Error> {
    for _ in 0..config.scan_lines {
        match loader.next_line()? {
            Some(line) => {
                if let Some(value) = parameter.extract(line, config) {
                    log::trace!("'{}' = {} on line {}", parameter.keyword(), value, loader.line_number());
                    return Ok(Some(value));
                }
            }
            None => break,
        }
    }
    Ok(None)
}

/// Sweep value embedded in a file name as the `token`-th `_` separated part,
/// e.g. token 2 of `sgx_perf_1024_run.txt` is `1024`.
pub fn filename_sweep_value(file_name: &str, token: usize) -> Option<u64> {
    leading_digits(file_name.split('_').nth(token)?)
}

/// Leading integer token of a dataset label, e.g. `"1024 bytes"` → `1024`.
pub fn leading_integer(label: &str) -> Option<u64> {
    label.split_whitespace().next()?.parse().ok()
}

fn leading_digits(token: &str) -> Option<u64> {
    let end = token.find(|c: char| !c.is_ascii_digit()).unwrap_or(token.len());
    token[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_len_from_framed_line() {
        assert_eq!(get_data_len("| Data len = 1024 |"), Some(1024));
    }

    #[test]
    fn keyword_and_delimiter_are_both_required() {
        assert_eq!(get_data_len("Data len = 1024"), None);
        assert_eq!(get_data_len("| Data size = 1024 |"), None);
        assert_eq!(get_data_len("| Data len = many |"), None);
        assert_eq!(get_data_len("| Data len |"), None);
    }

    #[test]
    fn other_parameters() {
        let config = MetadataConfig::default();
        assert_eq!(SweepParameter::DataSize.extract("| Data size = 64 |", &config), Some(64));
        assert_eq!(SweepParameter::Count.extract("| Iteration Count = 500 |", &config), Some(500));
        assert_eq!(SweepParameter::Count.label_for(500), "500 iterations");
        assert_eq!(SweepParameter::DataLen.label_for(1024), "1024 bytes");
    }

    #[test]
    fn custom_token_index() {
        let config = MetadataConfig {
            value_token: 2,
            ..MetadataConfig::default()
        };
        assert_eq!(SweepParameter::Count.extract("|Count: 42|", &config), None);
        assert_eq!(SweepParameter::Count.extract("| Count 42 |", &config), Some(42));
    }

    #[test]
    fn read_sweep_value_stops_after_scan_window() {
        let text = "banner\n| Data len = 2048 |\n-- Read --\n";
        let mut loader = LogLoader::from_reader(text.as_bytes());
        let config = MetadataConfig::default();
        assert_eq!(read_sweep_value(&mut loader, SweepParameter::DataLen, &config).unwrap(), Some(2048));

        let narrow = MetadataConfig {
            scan_lines: 1,
            ..MetadataConfig::default()
        };
        let mut loader = LogLoader::from_reader(text.as_bytes());
        assert_eq!(read_sweep_value(&mut loader, SweepParameter::DataLen, &narrow).unwrap(), None);
    }

    #[test]
    fn filename_tokens() {
        assert_eq!(filename_sweep_value("sgx_perf_1024_run.txt", 2), Some(1024));
        assert_eq!(filename_sweep_value("sgx_perf_64.log", 2), Some(64));
        assert_eq!(filename_sweep_value("sgx_perf.log", 2), None);
        assert_eq!(filename_sweep_value("sgx_perf_x64.log", 2), None);
    }

    #[test]
    fn leading_integer_of_labels() {
        assert_eq!(leading_integer("1024 bytes"), Some(1024));
        assert_eq!(leading_integer("SGX Driver"), None);
        assert_eq!(leading_integer(""), None);
    }
}
