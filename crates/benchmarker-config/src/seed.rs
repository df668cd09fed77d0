// crates/benchmarker-config/src/seed.rs
// ============================================================================
// Module: Reference Data Seed
// Description: TOML seed files for the reference catalog.
// Purpose: Load and validate operator-maintained reference data.
// Dependencies: benchmarker-core, toml
// ============================================================================

//! ## Overview
//! A seed file lists the machines, products with their commits, benchmarks,
//! metrics, and configurations a store should accept. Table names are
//! lowercase; entry keys are `PascalCase` to match the submission format.
//!
//! ```toml
//! [[machines]]
//! Name = "bench-01"
//! Architecture = "amd64"
//!
//! [[products]]
//! Name = "mono"
//! Commits = ["0123456789abcdef"]
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use benchmarker_core::ReferenceData;

use crate::config::ConfigError;
use crate::config::validate_path;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum seed file size in bytes.
pub const MAX_SEED_FILE_SIZE: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a reference data seed file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, parsed, or validated.
pub fn load_reference_data(path: &Path) -> Result<ReferenceData, ConfigError> {
    validate_path(path)?;
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_SEED_FILE_SIZE {
        return Err(ConfigError::Invalid("seed file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("seed file must be utf-8".to_string()))?;
    parse_reference_data(content)
}

/// Parses and validates reference data from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError`] when parsing or validation fails.
pub fn parse_reference_data(content: &str) -> Result<ReferenceData, ConfigError> {
    let data: ReferenceData =
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    validate_reference_data(&data)?;
    Ok(data)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Rejects empty and duplicate names within each catalog section.
fn validate_reference_data(data: &ReferenceData) -> Result<(), ConfigError> {
    unique_names("machines", data.machines.iter().map(|machine| machine.name.as_str()))?;
    unique_names("products", data.products.iter().map(|product| product.name.as_str()))?;
    unique_names("benchmarks", data.benchmarks.iter().map(|entry| entry.name.as_str()))?;
    unique_names("metrics", data.metrics.iter().map(|entry| entry.name.as_str()))?;
    unique_names("configs", data.configs.iter().map(|config| config.name.as_str()))?;
    for product in &data.products {
        let label = format!("products.{}.Commits", product.name);
        unique_names(&label, product.commits.iter().map(|commit| commit.as_str()))?;
    }
    Ok(())
}

/// Ensures every name is non-empty and appears once.
fn unique_names<'a>(
    section: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{section} entries must be non-empty")));
        }
        if !seen.insert(name) {
            return Err(ConfigError::Invalid(format!("{section} lists {name} more than once")));
        }
    }
    Ok(())
}
