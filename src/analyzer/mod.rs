//! Analyzer module for benchmark log parsing and aggregation.
//!
//! Provides functionality for:
//! - Reading log files line by line
//! - Grouping timing lines under section headers and computing statistics
//! - Extracting sweep parameters and batch parsing whole folders

pub mod batch;
pub mod log_loader;
pub mod log_parser;
pub mod metadata;
pub mod statistics;
pub mod types;

pub use batch::parse_folder;
pub use log_parser::{parse_log_file, parse_log_str};
pub use metadata::SweepParameter;
pub use types::{AnalyzerError, DataSet, DataSource, ResultSet, StatKind, Statistics, TimeUnit};
