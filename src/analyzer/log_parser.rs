//! Parse benchmark logs into per-section statistics.
//!
//! A log groups timing lines under section headers:
//!
//! ```text
//! | Data len = 1024 |
//! -- Read --
//! 1; 0 s; 48211 (ns)
//! 2; 0 s; 47790 (ns)
//! # ecall returned 0
//! -- Construct enclave --
//! 1; 1 s; 20311 (ns)
//! ```
//!
//! Each data line yields one reading: field 1 plus field 2, both converted
//! to nanoseconds.

use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

use crate::common::config::ParserConfig;

use super::log_loader::LogLoader;
use super::types::{AnalyzerError, Reading, ResultSet, Statistics, TimeUnit};

/// Unit suffixes, longest match first so `ns` wins over `s`.
const UNIT_SUFFIXES: &[(&str, TimeUnit)] = &[
    ("(ns)", TimeUnit::Nanoseconds),
    ("(us)", TimeUnit::Microseconds),
    ("(ms)", TimeUnit::Milliseconds),
    ("(s)", TimeUnit::Seconds),
    ("ns", TimeUnit::Nanoseconds),
    ("us", TimeUnit::Microseconds),
    ("ms", TimeUnit::Milliseconds),
    ("s", TimeUnit::Seconds),
];

/// Line-by-line section accumulator.
pub struct SectionParser<'a> {
    config: &'a ParserConfig,
    current: Option<String>,
    readings: Vec<Reading>,
    sections: IndexMap<String, Statistics>,
    line_number: usize,
}

impl<'a> SectionParser<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self {
            config,
            current: None,
            readings: Vec::new(),
            sections: IndexMap::new(),
            line_number: 0,
        }
    }

    /// Feed one line (without terminator).
    ///
    /// # Returns
    ///
    /// `Err(AnalyzerError::Parse)` for a data line whose timing fields are
    /// missing or malformed.
    pub fn handle_line(&mut self, line: &str) -> Result<(), AnalyzerError> {
        self.line_number += 1;

        if line.contains(self.config.header_marker.as_str()) {
            self.flush()?;
            let label = section_label(line, &self.config.header_marker);
            if label.is_empty() {
                log::debug!("Header on line {} has no label, closing section", self.line_number);
                self.current = None;
            } else {
                self.current = Some(label);
            }
            return Ok(());
        }

        if self.current.is_none() || line.trim().is_empty() || self.is_trace(line) {
            return Ok(());
        }

        let reading = parse_reading(line, self.config).map_err(|message| AnalyzerError::Parse {
            path: None,
            line: self.line_number,
            message,
        })?;
        self.readings.push(reading);
        Ok(())
    }

    /// Flush the pending section and return the result set.
    pub fn finish(mut self) -> Result<ResultSet, AnalyzerError> {
        self.flush()?;
        Ok(ResultSet::from_sections(self.sections))
    }

    fn is_trace(&self, line: &str) -> bool {
        !self.config.trace_marker.is_empty() && line.contains(self.config.trace_marker.as_str())
    }

    fn flush(&mut self) -> Result<(), AnalyzerError> {
        let readings = std::mem::take(&mut self.readings);
        let Some(label) = self.current.take() else {
            return Ok(());
        };
        if readings.is_empty() {
            log::debug!("Section '{}' has no readings, dropped", label);
            return Ok(());
        }
        if self.sections.contains_key(&label) {
            log::warn!("Section '{}' repeated, keeping the first occurrence", label);
            return Ok(());
        }
        let stats = Statistics::from_readings(&readings)?;
        self.sections.insert(label, stats);
        Ok(())
    }
}

/// Derive a section label from a header line: marker characters and
/// whitespace trimmed, first word, capitalised.
///
/// `"-- Read/Write enclave data --"` becomes `"Read/write"`.
pub fn section_label(line: &str, marker: &str) -> String {
    let trimmed = line.trim_matches(|c: char| c.is_whitespace() || marker.contains(c));
    let word = trimmed.split_whitespace().next().unwrap_or("");
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parse one timing field into nanoseconds.
///
/// The value may carry a unit suffix (`(ns)`, `us`, `5s`, ...) and embedded
/// whitespace; without a suffix `default_unit` applies.
pub fn parse_duration_field(field: &str, default_unit: TimeUnit) -> Result<Reading, String> {
    let trimmed = field.trim();
    let (number, unit) = UNIT_SUFFIXES
        .iter()
        .find_map(|(suffix, unit)| trimmed.strip_suffix(suffix).map(|rest| (rest, *unit)))
        .unwrap_or((trimmed, default_unit));

    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return Err(format!("empty timing field '{}'", field.trim()));
    }
    let value: u64 = digits.parse().map_err(|_| format!("invalid timing field '{}'", field.trim()))?;
    value
        .checked_mul(unit.nanos())
        .ok_or_else(|| format!("timing field '{}' overflows", field.trim()))
}

fn parse_reading(line: &str, config: &ParserConfig) -> Result<Reading, String> {
    let fields: Vec<&str> = line.split(config.field_delimiter).collect();
    if fields.len() < 3 {
        return Err(format!("expected at least 3 '{}' separated fields, found {}", config.field_delimiter, fields.len()));
    }
    let first = parse_duration_field(fields[1], config.first_field_unit)?;
    let second = parse_duration_field(fields[2], config.second_field_unit)?;
    first.checked_add(second).ok_or_else(|| "reading overflows".to_string())
}

/// Parse every line of a loader into a result set.
pub fn parse_log<R: BufRead>(loader: &mut LogLoader<R>, config: &ParserConfig) -> Result<ResultSet, AnalyzerError> {
    let path = loader.path().map(Path::to_path_buf);
    let mut parser = SectionParser::new(config);

    loop {
        let line = match loader.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                return Err(AnalyzerError::FileRead {
                    path: path.clone().unwrap_or_default(),
                    message: e.to_string(),
                });
            }
        };
        parser.handle_line(line).map_err(|e| match e {
            AnalyzerError::Parse { line, message, .. } => AnalyzerError::Parse {
                path: path.clone(),
                line,
                message,
            },
            other => other,
        })?;
    }

    parser.finish()
}

/// Open and parse a log file.
pub fn parse_log_file(path: &Path, config: &ParserConfig) -> Result<ResultSet, AnalyzerError> {
    let mut loader = LogLoader::open(path).map_err(|e| AnalyzerError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let results = parse_log(&mut loader, config)?;
    log::debug!("Parsed {} section(s) from {}", results.len(), path.display());
    Ok(results)
}

/// Parse log text held in memory.
pub fn parse_log_str(text: &str, config: &ParserConfig) -> Result<ResultSet, AnalyzerError> {
    parse_log(&mut LogLoader::from_reader(text.as_bytes()), config)
}
