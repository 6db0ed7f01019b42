//! Folder batch parsing for size and iteration sweeps.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::config::AnalysisConfig;

use super::log_loader::LogLoader;
use super::log_parser::parse_log_file;
use super::metadata::{SweepParameter, filename_sweep_value, read_sweep_value};
use super::types::{AnalyzerError, DataSet};

/// Parse every log in `dir` into a data set keyed by sweep value.
///
/// Files without the metadata line, or whose value exceeds
/// `batch.max_value`, are skipped. Labels follow
/// [`SweepParameter::label_for`].
///
/// # Parameters
///
/// * `dir` - Directory holding one log per sweep value
/// * `parameter` - Which metadata keyword carries the sweep value
/// * `config` - Parser, metadata and batch settings
pub fn parse_folder(dir: &Path, parameter: SweepParameter, config: &AnalysisConfig) -> Result<DataSet, AnalyzerError> {
    let files = list_log_files(dir, config)?;
    log::info!("Scanning {} file(s) in {} for '{}'", files.len(), dir.display(), parameter.keyword());

    let mut data = DataSet::new();
    for file in files {
        let mut loader = LogLoader::open(&file).map_err(|e| AnalyzerError::FileRead {
            path: file.clone(),
            message: e.to_string(),
        })?;
        let value = read_sweep_value(&mut loader, parameter, &config.metadata).map_err(|e| AnalyzerError::FileRead {
            path: file.clone(),
            message: e.to_string(),
        })?;

        let Some(value) = value else {
            log::debug!("No '{}' line in {}, skipped", parameter.keyword(), file.display());
            continue;
        };
        if let Some(max) = config.batch.max_value {
            if value > max {
                log::info!("{} has {} = {} above limit {}, skipped", file.display(), parameter.keyword(), value, max);
                continue;
            }
        }

        let label = parameter.label_for(value);
        if data.get(&label).is_some() {
            log::warn!("Duplicate data set '{}' from {}, keeping the earlier file", label, file.display());
            continue;
        }
        let results = parse_log_file(&file, &config.parser)?;
        if results.is_empty() {
            log::warn!("{} has no timing sections", file.display());
        }
        data.add(label, results);
    }

    log::info!(
        "{} data set(s) from {}: {}",
        data.len(),
        dir.display(),
        data.labels().collect::<Vec<_>>().join(", ")
    );
    Ok(data)
}

/// Regular files of `dir`, ordered by filename sweep token or by name.
fn list_log_files(dir: &Path, config: &AnalysisConfig) -> Result<Vec<PathBuf>, AnalyzerError> {
    let read_error = |e: std::io::Error| AnalyzerError::FileRead {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() {
            files.push(path);
        }
    }

    let token = config.batch.filename_token;
    if config.batch.sort_by_filename {
        files.sort_by_cached_key(|path| {
            let name = file_name(path);
            let value = filename_sweep_value(&name, token);
            (value.is_none(), value, name)
        });
    } else {
        files.sort_by_cached_key(|path| file_name(path));
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_log(dir: &Path, name: &str, data_len: Option<u64>, read_ns: u64) {
        let mut text = String::from("SGX perf run\n");
        if let Some(len) = data_len {
            text.push_str(&format!("| Data len = {} |\n", len));
        }
        text.push_str(&format!("-- Read --\n1; 0 s; {} (ns)\n2; 0 s; {} (ns)\n", read_ns, read_ns));
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn builds_dataset_in_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "sgx_perf_100_run.txt", Some(100), 300);
        write_log(dir.path(), "sgx_perf_2_run.txt", Some(2), 100);
        write_log(dir.path(), "sgx_perf_10_run.txt", Some(10), 200);

        let data = parse_folder(dir.path(), SweepParameter::DataLen, &AnalysisConfig::default()).unwrap();
        assert_eq!(data.labels().collect::<Vec<_>>(), vec!["2 bytes", "10 bytes", "100 bytes"]);
        assert_eq!(data.get("10 bytes").unwrap().get_test("Read").unwrap().mean, 200.0);
    }

    #[test]
    fn skips_files_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "sgx_perf_1_run.txt", Some(1), 10);
        write_log(dir.path(), "sgx_perf_2_run.txt", None, 20);
        fs::write(dir.path().join("notes.txt"), "nothing to see\n").unwrap();

        let data = parse_folder(dir.path(), SweepParameter::DataLen, &AnalysisConfig::default()).unwrap();
        assert_eq!(data.labels().collect::<Vec<_>>(), vec!["1 bytes"]);
    }

    #[test]
    fn skips_values_above_limit() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "sgx_perf_1024_run.txt", Some(1024), 10);
        write_log(dir.path(), "sgx_perf_8192_run.txt", Some(8192), 20);

        let mut config = AnalysisConfig::default();
        config.batch.max_value = Some(4096);
        let data = parse_folder(dir.path(), SweepParameter::DataLen, &config).unwrap();
        assert_eq!(data.labels().collect::<Vec<_>>(), vec!["1024 bytes"]);
    }

    #[test]
    fn duplicate_values_keep_first_file() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "a_run_1.txt", Some(64), 10);
        write_log(dir.path(), "b_run_2.txt", Some(64), 99);

        let data = parse_folder(dir.path(), SweepParameter::DataLen, &AnalysisConfig::default()).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("64 bytes").unwrap().get_test("Read").unwrap().mean, 10.0);
    }

    #[test]
    fn name_order_when_filename_sort_disabled() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "sgx_perf_100_run.txt", Some(100), 1);
        write_log(dir.path(), "sgx_perf_20_run.txt", Some(20), 1);

        let mut config = AnalysisConfig::default();
        config.batch.sort_by_filename = false;
        let data = parse_folder(dir.path(), SweepParameter::DataLen, &config).unwrap();
        assert_eq!(data.labels().collect::<Vec<_>>(), vec!["100 bytes", "20 bytes"]);
    }

    #[test]
    fn malformed_log_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sgx_perf_1_run.txt"), "| Data len = 1 |\n-- Read --\n1; oops; 2\n").unwrap();
        let err = parse_folder(dir.path(), SweepParameter::DataLen, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { line: 3, .. }));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_folder(&dir.path().join("absent"), SweepParameter::Count, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalyzerError::FileRead { .. }));
    }
}
