// crates/benchmarker-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration and seed payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical examples for `benchmarker.toml` and the reference data seed
//! format. Both are parsed by the crate's tests, so they stay valid.

/// Returns a canonical example `benchmarker.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8081"
max_body_bytes = 16777216

[store]
path = "benchmarker.sqlite"
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"

[audit]
enabled = true
# path = "audit.jsonl"
"#,
    )
}

/// Returns a canonical example reference data seed file.
#[must_use]
pub fn seed_toml_example() -> String {
    String::from(
        r#"[[machines]]
Name = "bench-01"
Architecture = "amd64"

[[products]]
Name = "mono"
Commits = ["0123456789abcdef0123456789abcdef01234567"]

[[products]]
Name = "llvm"
Commits = ["aaaa1111bbbb2222cccc3333dddd4444eeee5555"]

[[benchmarks]]
Name = "nbody"

[[benchmarks]]
Name = "binarytrees"

[[metrics]]
Name = "time"
ResultType = "doubleArray"

[[metrics]]
Name = "memory-integral"
ResultType = "double"

[[metrics]]
Name = "jit-version"
ResultType = "string"

[[configs]]
Name = "default"
MonoExecutable = "mono"
MonoOptions = ["--llvm"]

[configs.MonoEnvironmentVariables]
MONO_GC = "sgen"
"#,
    )
}
