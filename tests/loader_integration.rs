//! End-to-end loading scenarios against real files and the process environment.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serial_test::serial;
use tempfile::TempDir;

use layered_config::{ConfigError, ConfigLoader, ProcessEnvironment, Value};

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Builds the layout used by the directory tests:
///
/// ```text
/// conf/
///   a.env          VAL1="1"
///   b.json         {"VAL2": 2}
///   nested/c.env   VAL3="3"
/// ```
fn config_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.env", "VAL1=\"1\"\n");
    write(dir.path(), "b.json", r#"{"VAL2": 2}"#);
    write(dir.path(), "nested/c.env", "VAL3=\"3\"\n");
    dir
}

#[test]
fn directory_load_then_types() {
    let dir = config_dir();
    let mut config = ConfigLoader::new();
    config.load_dir(dir.path(), true).unwrap();

    assert_eq!(config.get_string("VAL1", ""), "1");
    assert_eq!(config.get_int("VAL1", 0), 1);
    assert_eq!(config.get_string("VAL2", ""), "2");
    assert_eq!(config.get_int("VAL2", 0), 2);

    assert_eq!(config.delete("VAL3").unwrap(), Some(Value::from("3")));
    assert_eq!(config.get("VAL3"), None);
    assert_eq!(config.get_string("VAL3", ""), "");
    assert_eq!(config.get_int("VAL3", 0), 0);
}

#[test]
fn later_file_wins_in_sorted_scan() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "01-defaults.ini", "mode = development\nworkers = 2\n");
    write(dir.path(), "02-production.yaml", "mode: production\n");
    write(dir.path(), "03-local.env", "WORKERS_LABEL=${mode}-${workers}\n");

    let config = ConfigLoader::builder()
        .sort_dir_entries(true)
        .with_dir(dir.path(), false)
        .build()
        .unwrap();

    assert_eq!(config.get("mode"), Some(&Value::from("production")));
    assert_eq!(config.get("workers"), Some(&Value::Integer(2)));
    assert_eq!(config.get("WORKERS_LABEL"), Some(&Value::from("production-2")));
}

#[test]
fn failed_scan_keeps_earlier_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.env", "FIRST=1\n");
    write(dir.path(), "b.txt", "not config\n");

    let mut config = ConfigLoader::builder().sort_dir_entries(true).build().unwrap();
    let result = config.load_dir(dir.path(), false);

    assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
    assert_eq!(config.get("FIRST"), Some(&Value::Integer(1)));
}

#[test]
fn lock_blocks_directory_load() {
    let dir = config_dir();
    let mut config = ConfigLoader::new();
    config.load_dir(dir.path(), true).unwrap();
    config.lock();

    let before = config.to_table();
    assert!(matches!(config.delete("VAL3"), Err(ConfigError::Locked)));
    assert!(matches!(config.load_dir(dir.path(), true), Err(ConfigError::Locked)));
    assert_eq!(config.to_table(), before);
    assert_eq!(config.get("VAL3"), Some(&Value::from("3")));

    config.unlock();
    config.load_dir(dir.path(), false).unwrap();
    assert_eq!(config.delete("VAL2").unwrap(), Some(Value::Integer(2)));
    assert_eq!(config.get("VAL2"), None);
}

#[test]
#[serial]
fn export_to_process_environment() {
    let mut config = ConfigLoader::new();
    config.set("LAYERED_CONFIG_IT_VAL1", "1").unwrap();
    config.set("LAYERED_CONFIG_IT_VAL2", 2).unwrap();

    config.export_to_process(false);
    assert_eq!(std::env::var("LAYERED_CONFIG_IT_VAL1").unwrap(), "1");
    assert_eq!(std::env::var("LAYERED_CONFIG_IT_VAL2").unwrap(), "2");
    assert_eq!(
        ProcessEnvironment::constant("LAYERED_CONFIG_IT_VAL2"),
        Some(Value::Integer(2))
    );

    config.set("LAYERED_CONFIG_IT_VAL1", "overwrite").unwrap();
    config.export_to_process(false);
    assert_eq!(std::env::var("LAYERED_CONFIG_IT_VAL1").unwrap(), "1");

    config.export_to_process(true);
    assert_eq!(std::env::var("LAYERED_CONFIG_IT_VAL1").unwrap(), "overwrite");
    assert_eq!(
        ProcessEnvironment::constant("LAYERED_CONFIG_IT_VAL1"),
        Some(Value::from("1"))
    );
}

#[test]
#[serial]
fn import_from_process_environment() {
    std::env::set_var("LAYERED_CONFIG_IT_PORT", "9090");
    std::env::set_var("LAYERED_CONFIG_IT_UNKNOWN", "x");

    let mut config = ConfigLoader::new();
    config.set("LAYERED_CONFIG_IT_PORT", 80).unwrap();
    config.load_environment(true).unwrap();

    assert_eq!(config.get("LAYERED_CONFIG_IT_PORT"), Some(&Value::Integer(9090)));
    assert_eq!(config.get("LAYERED_CONFIG_IT_UNKNOWN"), None);

    config.load_environment(false).unwrap();
    assert_eq!(config.get("LAYERED_CONFIG_IT_UNKNOWN"), Some(&Value::from("x")));

    std::env::remove_var("LAYERED_CONFIG_IT_PORT");
    std::env::remove_var("LAYERED_CONFIG_IT_UNKNOWN");
}
