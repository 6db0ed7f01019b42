//! Command line front end: parse SGX benchmark logs, compare or sweep them on
//! charts, and edit the enclave heap size.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Builder;
use indexmap::IndexMap;
use log::{LevelFilter, debug, error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::analyzer::{AnalyzerError, DataSet, DataSource, ResultSet, SweepParameter, parse_folder, parse_log_file, parse_log_str};
use crate::chart::export::render_all;
use crate::chart::series::available_metrics;
use crate::chart::{ChartKind, ChartOptions};
use crate::common::AnalysisConfig;
use crate::enclave::{HeapConfigError, parse_heap_size, set_heap};

mod analyzer;
mod chart;
mod common;
mod enclave;
mod ui;

#[derive(Parser, Debug)]
#[command(name = "sgx-bench-charts")]
#[command(about = "Parse SGX benchmark logs into statistics and charts")]
#[command(version)]
struct Cli {
    /// Analysis configuration (TOML). Defaults to ./bench.toml when present
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare single log files side by side, one bar per data set
    Compare {
        /// Data set label and log file
        #[arg(long = "dataset", value_name = "LABEL=PATH", required = true, value_parser = parse_key_path)]
        datasets: Vec<(String, PathBuf)>,

        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Parse folders of logs swept over a numeric parameter
    Sweep {
        /// Source tag and log folder
        #[arg(long = "source", value_name = "TAG=DIR", required = true, value_parser = parse_key_path)]
        sources: Vec<(String, PathBuf)>,

        /// Metadata line carrying the sweep value
        #[arg(long, value_enum, default_value_t = SweepParameter::DataLen)]
        parameter: SweepParameter,

        /// Logarithmic x axis
        #[arg(long)]
        log_scale: bool,

        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Print the statistics of log files as JSON
    Dump {
        /// Log files to parse, `-` for stdin
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Set the enclave heap size in Enclave.config.xml
    SetHeap {
        /// Heap size: decimal, 0x hex, 0o octal or 0b binary, at most 2^64 - 1
        size: Option<String>,

        /// Enclave configuration file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

/// Output switches shared by `compare` and `sweep`.
#[derive(Args, Debug)]
struct ChartArgs {
    /// Metric (section name) to chart; repeat for several. Defaults to all
    #[arg(long = "metric", value_name = "M")]
    metrics: Vec<String>,

    /// Chart layout
    #[arg(long, value_enum)]
    kind: Option<ChartKind>,

    /// Hide standard deviation error bars
    #[arg(long)]
    no_error_bars: bool,

    /// Write one SVG per metric into this directory
    #[arg(long, value_name = "DIR")]
    save: Option<PathBuf>,

    /// Do not open the chart window
    #[arg(long)]
    headless: bool,

    /// Print the aggregated data as JSON on stdout
    #[arg(long)]
    dump_json: bool,
}

impl ChartArgs {
    fn options(&self, default_kind: ChartKind, log_scale: bool) -> ChartOptions {
        ChartOptions {
            kind: self.kind.unwrap_or(default_kind),
            error_bars: !self.no_error_bars,
            log_scale,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        if let Some(HeapConfigError::InvalidValue(value)) = e.downcast_ref::<HeapConfigError>() {
            debug!("Rejected heap size '{}'", value);
            println!("Invalid value");
        } else {
            error!("{:#}", e);
        }
        std::process::exit(1);
    }
}

/// Info for dependencies, debug for this crate; each `-v` goes one level up.
fn init_logging(verbosity: u8) {
    let crate_level = match verbosity {
        0 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("sgx_bench_charts"), crate_level)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = AnalysisConfig::resolve(cli.config.as_deref()).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Compare { datasets, chart } => cmd_compare(&datasets, &chart, &config),
        Commands::Sweep {
            sources,
            parameter,
            log_scale,
            chart,
        } => cmd_sweep(&sources, parameter, log_scale, &chart, &config),
        Commands::Dump { paths } => cmd_dump(&paths, &config),
        Commands::SetHeap { size, file } => cmd_set_heap(size.as_deref(), file.as_deref(), &config),
    }
}

fn cmd_compare(datasets: &[(String, PathBuf)], chart: &ChartArgs, config: &AnalysisConfig) -> Result<()> {
    ensure_unique_labels(datasets, "data set label")?;
    ensure_unique_paths(datasets)?;

    let mut data = DataSet::new();
    for (label, path) in datasets {
        let results = parse_log_file(path, &config.parser).with_context(|| format!("Failed to load data set '{}'", label))?;
        if results.is_empty() {
            warn!("{} has no timing sections", path.display());
        }
        info!("{}: {} sections from {}", label, results.len(), path.display());
        data.add(label.clone(), results);
    }

    if chart.dump_json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }

    let sources = vec![DataSource { tag: String::new(), data }];
    present(sources, chart, chart.options(ChartKind::Bar, false), config)
}

fn cmd_sweep(
    sources: &[(String, PathBuf)],
    parameter: SweepParameter,
    log_scale: bool,
    chart: &ChartArgs,
    config: &AnalysisConfig,
) -> Result<()> {
    ensure_unique_labels(sources, "source tag")?;

    let mut parsed = Vec::with_capacity(sources.len());
    for (tag, dir) in sources {
        let mut data = parse_folder(dir, parameter, config).with_context(|| format!("Failed to load source '{}'", tag))?;
        data.sort_by_sweep_value();
        if data.is_empty() {
            warn!("Source '{}' has no logs with a '{}' value in {}", tag, parameter.keyword(), dir.display());
        }
        parsed.push(DataSource { tag: tag.clone(), data });
    }

    if chart.dump_json {
        let by_tag: IndexMap<&str, &DataSet> = parsed.iter().map(|s| (s.tag.as_str(), &s.data)).collect();
        println!("{}", serde_json::to_string_pretty(&by_tag)?);
    }

    present(parsed, chart, chart.options(ChartKind::Line, log_scale), config)
}

/// Save SVGs and/or open the viewer for parsed sources.
fn present(sources: Vec<DataSource>, chart: &ChartArgs, options: ChartOptions, config: &AnalysisConfig) -> Result<()> {
    let metrics = select_metrics(&sources, &chart.metrics);

    if let Some(dir) = &chart.save {
        let written = render_all(dir, &sources, &metrics, &options, &config.charts)?;
        info!("Saved {} chart(s) to {}", written.len(), dir.display());
    }

    if chart.headless {
        return Ok(());
    }
    ui::run_viewer(sources, metrics, config.charts.clone(), options)
}

fn cmd_dump(paths: &[PathBuf], config: &AnalysisConfig) -> Result<()> {
    let mut results: IndexMap<String, ResultSet> = IndexMap::new();
    for path in paths {
        let parsed = load_dump_input(path, io::stdin().lock(), config)?;
        results.insert(path.display().to_string(), parsed);
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Parse a log file, or `stdin` when the path is `-`.
fn load_dump_input<R: Read>(path: &Path, mut stdin: R, config: &AnalysisConfig) -> Result<ResultSet> {
    if path != Path::new("-") {
        return Ok(parse_log_file(path, &config.parser)?);
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text).context("Failed to read log from stdin")?;
    Ok(parse_log_str(&text, &config.parser)?)
}

fn cmd_set_heap(size: Option<&str>, file: Option<&Path>, config: &AnalysisConfig) -> Result<()> {
    let value = size.unwrap_or(config.heap.default_size.as_str());
    let bytes = parse_heap_size(value)?;
    let path = file.unwrap_or(config.heap.config_path.as_path());
    debug!("Heap size {} = {} bytes", value, bytes);
    set_heap(path, &config.heap.element, value)?;
    Ok(())
}

/// Split `LABEL=PATH` at the first `=`.
fn parse_key_path(arg: &str) -> Result<(String, PathBuf), String> {
    let (key, path) = arg.split_once('=').ok_or_else(|| format!("expected LABEL=PATH, got '{}'", arg))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty label in '{}'", arg));
    }
    if path.is_empty() {
        return Err(format!("empty path in '{}'", arg));
    }
    Ok((key.to_string(), PathBuf::from(path)))
}

fn ensure_unique_labels(pairs: &[(String, PathBuf)], what: &str) -> Result<(), AnalyzerError> {
    let mut seen = HashSet::new();
    for (label, _) in pairs {
        if !seen.insert(label.as_str()) {
            return Err(AnalyzerError::DuplicateInput(format!("{} '{}' given more than once", what, label)));
        }
    }
    Ok(())
}

/// Two labels must not name the same file.
fn ensure_unique_paths(pairs: &[(String, PathBuf)]) -> Result<(), AnalyzerError> {
    let mut seen: Vec<(PathBuf, &str)> = Vec::with_capacity(pairs.len());
    for (label, path) in pairs {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.clone());
        if let Some((_, first)) = seen.iter().find(|(p, _)| *p == key) {
            return Err(AnalyzerError::DuplicateInput(format!(
                "'{}' and '{}' both read {}",
                first,
                label,
                path.display()
            )));
        }
        seen.push((key, label.as_str()));
    }
    Ok(())
}

/// Requested metrics that exist in the data, or every metric when none was requested.
fn select_metrics(sources: &[DataSource], requested: &[String]) -> Vec<String> {
    let available = available_metrics(sources);
    if requested.is_empty() {
        return available;
    }
    let mut selected = Vec::new();
    for metric in requested {
        if !available.contains(metric) {
            warn!("Metric '{}' not found in any data set", metric);
        } else if !selected.contains(metric) {
            selected.push(metric.clone());
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_path_splits_at_first_equals() {
        assert_eq!(
            parse_key_path("SGX Driver=logs/a=b.log").unwrap(),
            ("SGX Driver".to_string(), PathBuf::from("logs/a=b.log"))
        );
        assert!(parse_key_path("no-separator").is_err());
        assert!(parse_key_path("=path").is_err());
        assert!(parse_key_path("label=").is_err());
    }

    #[test]
    fn compare_arguments_parse() {
        let cli = Cli::try_parse_from([
            "sgx-bench-charts",
            "-vv",
            "compare",
            "--dataset",
            "SGX Driver=driver.log",
            "--dataset",
            "Virt SGX=virt.log",
            "--metric",
            "Read",
            "--no-error-bars",
            "--headless",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Compare { datasets, chart } = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(datasets.len(), 2);
        assert_eq!(chart.metrics, vec!["Read".to_string()]);
        let options = chart.options(ChartKind::Bar, false);
        assert_eq!(options.kind, ChartKind::Bar);
        assert!(!options.error_bars);
    }

    #[test]
    fn sweep_arguments_parse() {
        let cli = Cli::try_parse_from([
            "sgx-bench-charts",
            "sweep",
            "--source",
            "SGX Driver=logs/driver",
            "--parameter",
            "data-size",
            "--log-scale",
            "--kind",
            "line",
        ])
        .unwrap();
        let Commands::Sweep {
            parameter, log_scale, chart, ..
        } = cli.command
        else {
            panic!("expected sweep");
        };
        assert_eq!(parameter, SweepParameter::DataSize);
        assert!(log_scale);
        assert_eq!(chart.kind, Some(ChartKind::Line));
    }

    #[test]
    fn duplicate_inputs_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("a.log");
        fs::write(&log, "-- Read --\n1; 0 s; 5 (ns)\n").unwrap();

        let same_file = vec![("Virt SGX".to_string(), log.clone()), ("SGX KVM".to_string(), log.clone())];
        assert!(matches!(ensure_unique_paths(&same_file), Err(AnalyzerError::DuplicateInput(_))));

        let same_label = vec![("A".to_string(), log.clone()), ("A".to_string(), dir.path().join("b.log"))];
        assert!(matches!(ensure_unique_labels(&same_label, "label"), Err(AnalyzerError::DuplicateInput(_))));
    }

    #[test]
    fn metric_selection() {
        let mut data = DataSet::new();
        data.add(
            "A",
            analyzer::parse_log_str("-- Read --\n1; 0 s; 5 (ns)\n-- Write --\n1; 0 s; 6 (ns)\n", &Default::default()).unwrap(),
        );
        let sources = vec![DataSource { tag: String::new(), data }];
        assert_eq!(select_metrics(&sources, &[]), vec!["Read".to_string(), "Write".to_string()]);
        let requested = vec!["Write".to_string(), "Input".to_string(), "Write".to_string()];
        assert_eq!(select_metrics(&sources, &requested), vec!["Write".to_string()]);
    }

    #[test]
    fn set_heap_uses_default_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Enclave.config.xml");
        fs::write(&path, "<EnclaveConfiguration>\n  <HeapMaxSize>0x2000000</HeapMaxSize>\n</EnclaveConfiguration>\n").unwrap();
        let config = AnalysisConfig::default();

        cmd_set_heap(None, Some(&path), &config).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("<HeapMaxSize>0x1000000</HeapMaxSize>"));

        let err = cmd_set_heap(Some("12abc"), Some(&path), &config).unwrap_err();
        assert!(matches!(err.downcast_ref::<HeapConfigError>(), Some(HeapConfigError::InvalidValue(_))));
        assert!(fs::read_to_string(&path).unwrap().contains("0x1000000"));
    }

    #[test]
    fn dump_reads_stdin_for_dash() {
        let config = AnalysisConfig::default();
        let results = load_dump_input(Path::new("-"), "-- Write --\n1; 0 s; 7 (ns)\n".as_bytes(), &config).unwrap();
        assert_eq!(results.get_test("Write").unwrap().mean, 7.0);
        assert!(load_dump_input(Path::new("-"), "-- Write --\n1; x; 7\n".as_bytes(), &config).is_err());
    }

    #[test]
    fn dump_reads_all_paths() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("a.log");
        fs::write(&log, "-- Read --\n1; 0 s; 5 (ns)\n").unwrap();
        assert!(cmd_dump(&[log], &AnalysisConfig::default()).is_ok());
        assert!(cmd_dump(&[dir.path().join("missing.log")], &AnalysisConfig::default()).is_err());
    }
}
