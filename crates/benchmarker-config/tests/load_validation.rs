//! Config load validation tests for benchmarker-config.
// crates/benchmarker-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section validation.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use benchmarker_config::BenchmarkerConfig;
use benchmarker_config::ConfigError;
use benchmarker_config::config_toml_example;
use benchmarker_store_sqlite::SqliteStoreMode;
use benchmarker_store_sqlite::SqliteSyncMode;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<BenchmarkerConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(BenchmarkerConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(BenchmarkerConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(BenchmarkerConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(BenchmarkerConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("missing.toml");
    assert_invalid(BenchmarkerConfig::load(Some(&path)), "config io error")
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config("")?;
    let config = BenchmarkerConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let addr = config.server.bind_addr().map_err(|err| err.to_string())?;
    if addr.port() != 8081 || !addr.ip().is_loopback() {
        return Err(format!("unexpected default bind {addr}"));
    }
    if config.server.max_body_bytes != 16 * 1024 * 1024 {
        return Err("unexpected default body limit".to_string());
    }
    if config.store.journal_mode != SqliteStoreMode::Wal
        || config.store.sync_mode != SqliteSyncMode::Full
    {
        return Err("unexpected sqlite defaults".to_string());
    }
    if !config.audit.enabled || config.audit.path.is_some() {
        return Err("unexpected audit defaults".to_string());
    }
    Ok(())
}

#[test]
fn example_config_is_valid() -> TestResult {
    let config = BenchmarkerConfig::parse(&config_toml_example()).map_err(|err| err.to_string())?;
    let sqlite = config.store.sqlite_config();
    if sqlite.busy_timeout_ms != 5_000 || sqlite.path.to_string_lossy() != "benchmarker.sqlite" {
        return Err("example store settings not carried into sqlite config".to_string());
    }
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> TestResult {
    assert_invalid(BenchmarkerConfig::parse("[server]\nport = 8081\n"), "config parse error")?;
    assert_invalid(BenchmarkerConfig::parse("[metrics]\nenabled = true\n"), "config parse error")
}

#[test]
fn invalid_bind_is_rejected() -> TestResult {
    assert_invalid(
        BenchmarkerConfig::parse("[server]\nbind = \"localhost\"\n"),
        "invalid bind address",
    )
}

#[test]
fn body_limit_bounds_are_enforced() -> TestResult {
    assert_invalid(
        BenchmarkerConfig::parse("[server]\nmax_body_bytes = 0\n"),
        "must be greater than zero",
    )?;
    assert_invalid(
        BenchmarkerConfig::parse("[server]\nmax_body_bytes = 268435457\n"),
        "must be at most",
    )
}

#[test]
fn empty_store_path_is_rejected() -> TestResult {
    assert_invalid(BenchmarkerConfig::parse("[store]\npath = \" \"\n"), "store.path must be non-empty")
}

#[test]
fn unknown_journal_mode_is_rejected() -> TestResult {
    assert_invalid(BenchmarkerConfig::parse("[store]\njournal_mode = \"memory\"\n"), "config parse error")
}

#[test]
fn empty_audit_path_is_rejected() -> TestResult {
    assert_invalid(BenchmarkerConfig::parse("[audit]\npath = \"\"\n"), "audit.path must be non-empty")
}
