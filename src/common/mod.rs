//! Shared configuration used by the analyzer, chart renderer and heap editor.

pub mod config;

pub use config::AnalysisConfig;
