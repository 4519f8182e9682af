use std::fs;
use std::path::PathBuf;

use feature_rank_core::{JobConfig, JobError};

// ============================================================
// Defaults and file loading
// ============================================================

#[test]
fn test_defaults() {
    let config = JobConfig::new(PathBuf::from("in.csv"), PathBuf::from("out.tsv"));

    assert_eq!(config.top_k, 13);
    assert_eq!(config.decimals, 3);
    assert_eq!(config.shard_size, 10_000);
    assert_eq!(config.retry_limit, 3);
    assert_eq!(config.expected_dims, None);
}

#[test]
fn test_load_fills_unset_tunables_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"top_k": 5, "workers": 2}"#).unwrap();

    let config = JobConfig::load(&path, PathBuf::from("in.csv"), PathBuf::from("out.tsv")).unwrap();

    assert_eq!(config.top_k, 5);
    assert_eq!(config.workers, 2);
    assert_eq!(config.decimals, 3);
    assert_eq!(config.input_path, PathBuf::from("in.csv"));
    assert_eq!(config.output_path, PathBuf::from("out.tsv"));
}

#[test]
fn test_load_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "not json").unwrap();

    let result = JobConfig::load(&path, PathBuf::from("in"), PathBuf::from("out"));
    assert!(matches!(result, Err(JobError::Config(_))));
}

#[test]
fn test_load_rejects_missing_file() {
    let result = JobConfig::load(
        &PathBuf::from("/no/such/config.json"),
        PathBuf::from("in"),
        PathBuf::from("out"),
    );
    assert!(matches!(result, Err(JobError::Config(_))));
}

// ============================================================
// Validation
// ============================================================

#[test]
fn test_zero_shard_size_rejected() {
    let mut config = JobConfig::new(PathBuf::from("in"), PathBuf::from("out"));
    config.shard_size = 0;

    assert!(matches!(config.validate(), Err(JobError::Config(_))));
}

#[test]
fn test_zero_workers_rejected() {
    let mut config = JobConfig::new(PathBuf::from("in"), PathBuf::from("out"));
    config.workers = 0;

    assert!(matches!(config.validate(), Err(JobError::Config(_))));
}

#[test]
fn test_zero_top_k_rejected() {
    let mut config = JobConfig::new(PathBuf::from("in"), PathBuf::from("out"));
    config.top_k = 0;

    assert!(matches!(config.validate(), Err(JobError::Config(_))));
}
