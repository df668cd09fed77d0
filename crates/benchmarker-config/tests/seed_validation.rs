//! Reference data seed tests for benchmarker-config.
// crates/benchmarker-config/tests/seed_validation.rs
// =============================================================================
// Module: Seed Validation Tests
// Description: Validate reference data seed parsing and guards.
// Purpose: Ensure seed files map onto the reference catalog exactly.
// =============================================================================

use std::io::Write;

use benchmarker_config::load_reference_data;
use benchmarker_config::parse_reference_data;
use benchmarker_config::seed_toml_example;
use benchmarker_core::MetricKind;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

#[test]
fn example_seed_parses_every_section() -> TestResult {
    let data = parse_reference_data(&seed_toml_example()).map_err(|err| err.to_string())?;
    if data.machines.len() != 1 || data.products.len() != 2 || data.benchmarks.len() != 2 {
        return Err("unexpected entry counts".to_string());
    }
    let kinds: Vec<MetricKind> = data.metrics.iter().map(|metric| metric.result_type).collect();
    if kinds != vec![MetricKind::DoubleArray, MetricKind::Double, MetricKind::String] {
        return Err(format!("unexpected metric kinds {kinds:?}"));
    }
    let config = data.configs.first().ok_or("missing config")?;
    if config.mono_environment_variables.get("MONO_GC").map(String::as_str) != Some("sgen") {
        return Err("environment variables not parsed".to_string());
    }
    Ok(())
}

#[test]
fn seed_loads_from_disk() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(seed_toml_example().as_bytes()).map_err(|err| err.to_string())?;
    let data = load_reference_data(file.path()).map_err(|err| err.to_string())?;
    if data.products[0].commits.len() != 1 {
        return Err("commits not loaded".to_string());
    }
    Ok(())
}

#[test]
fn snake_case_entry_keys_are_rejected() -> TestResult {
    match parse_reference_data("[[machines]]\nname = \"bench-01\"\narchitecture = \"amd64\"\n") {
        Err(error) if error.to_string().contains("config parse error") => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn unknown_metric_kind_is_rejected() -> TestResult {
    match parse_reference_data("[[metrics]]\nName = \"time\"\nResultType = \"int\"\n") {
        Err(error) if error.to_string().contains("config parse error") => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn duplicate_configs_are_rejected() -> TestResult {
    let seed = "[[configs]]\nName = \"default\"\n\n[[configs]]\nName = \"default\"\n";
    match parse_reference_data(seed) {
        Err(error) if error.to_string().contains("configs lists default more than once") => Ok(()),
        other => Err(format!("expected duplicate error, got {other:?}")),
    }
}
