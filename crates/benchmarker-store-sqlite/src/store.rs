// crates/benchmarker-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Run Set Store
// Description: Durable run set store and reference catalog backed by SQLite.
// Purpose: Persist run sets and serve reference lookups inside one transaction.
// Dependencies: benchmarker-core, rusqlite, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! [`SqliteStore`] owns one `SQLite` connection behind a mutex. Every session
//! holds the lock for its whole lifetime and runs inside `BEGIN IMMEDIATE`, so
//! sessions are fully serialized and a session that is dropped without commit
//! is rolled back.
//!
//! Reference tables (machines, products and commits, benchmarks, metrics,
//! configs) are written only by [`SqliteStore::import_reference_data`]. Run
//! sets reference them through foreign keys, so a run naming an unknown
//! benchmark is rejected by the database as invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use benchmarker_core::BenchmarkName;
use benchmarker_core::CatalogError;
use benchmarker_core::CommitHash;
use benchmarker_core::Config;
use benchmarker_core::Machine;
use benchmarker_core::MetricKind;
use benchmarker_core::MetricName;
use benchmarker_core::Product;
use benchmarker_core::ReferenceCatalog;
use benchmarker_core::ReferenceData;
use benchmarker_core::Run;
use benchmarker_core::RunSet;
use benchmarker_core::RunSetId;
use benchmarker_core::RunSetStore;
use benchmarker_core::SessionSource;
use benchmarker_core::StoreError;
use benchmarker_core::StoreSession;
use benchmarker_core::resolve_commit;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` run set store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default tuning.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding submitted result payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data cannot be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Data rejected by a constraint or validation rule.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Corrupt(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

impl From<SqliteStoreError> for CatalogError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Maps a `rusqlite` error, treating constraint violations as invalid data.
fn db_error(error: rusqlite::Error) -> SqliteStoreError {
    match error {
        rusqlite::Error::SqliteFailure(err, message)
            if err.code == ErrorCode::ConstraintViolation =>
        {
            SqliteStoreError::Invalid(message.unwrap_or_else(|| err.to_string()))
        }
        other => SqliteStoreError::Db(other.to_string()),
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Counts of reference rows written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Machines inserted or updated.
    pub machines: usize,
    /// Products inserted or updated.
    pub products: usize,
    /// Commits inserted or updated.
    pub commits: usize,
    /// Benchmarks inserted or updated.
    pub benchmarks: usize,
    /// Metrics inserted or updated.
    pub metrics: usize,
    /// Configs inserted or updated.
    pub configs: usize,
}

/// `SQLite`-backed run set store and reference catalog.
///
/// # Invariants
/// - `SQLite` connection access is serialized through a mutex.
/// - At most one session is open at a time.
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared connection.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens an `SQLite`-backed store, creating the schema when needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when it carries an unknown schema version.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex is poisoned or the query fails.
    pub fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard.execute_batch("SELECT 1").map_err(db_error)
    }

    /// Upserts reference data in one transaction.
    ///
    /// Existing rows keep their identity; attributes are overwritten. Nothing
    /// is deleted, so importing the same file twice is a no-op. Stored run
    /// sets keep the machine and config attributes they were inserted with.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when any row cannot be written; no row is
    /// written then.
    pub fn import_reference_data(
        &self,
        data: &ReferenceData,
    ) -> Result<ImportSummary, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let mut summary = ImportSummary::default();

        for machine in &data.machines {
            tx.execute(
                "INSERT INTO machines (name, architecture) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET architecture = excluded.architecture",
                params![machine.name, machine.architecture],
            )
            .map_err(db_error)?;
            summary.machines += 1;
        }
        for product in &data.products {
            tx.execute("INSERT OR IGNORE INTO products (name) VALUES (?1)", params![product.name])
                .map_err(db_error)?;
            summary.products += 1;
            for commit in &product.commits {
                if commit.as_str().is_empty() {
                    return Err(SqliteStoreError::Invalid(format!(
                        "product {} lists an empty commit",
                        product.name
                    )));
                }
                tx.execute(
                    "INSERT OR IGNORE INTO commits (product, hash) VALUES (?1, ?2)",
                    params![product.name, commit.as_str()],
                )
                .map_err(db_error)?;
                summary.commits += 1;
            }
        }
        for benchmark in &data.benchmarks {
            tx.execute(
                "INSERT OR IGNORE INTO benchmarks (name) VALUES (?1)",
                params![benchmark.name.as_str()],
            )
            .map_err(db_error)?;
            summary.benchmarks += 1;
        }
        for metric in &data.metrics {
            tx.execute(
                "INSERT INTO metrics (name, result_type) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET result_type = excluded.result_type",
                params![metric.name.as_str(), metric.result_type.as_str()],
            )
            .map_err(db_error)?;
            summary.metrics += 1;
        }
        for config in &data.configs {
            tx.execute(
                "INSERT INTO configs (name, mono_executable, mono_environment_variables, \
                 mono_options)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET
                     mono_executable = excluded.mono_executable,
                     mono_environment_variables = excluded.mono_environment_variables,
                     mono_options = excluded.mono_options",
                params![
                    config.name,
                    config.mono_executable,
                    encode_json(&config.mono_environment_variables)?,
                    encode_json(&config.mono_options)?,
                ],
            )
            .map_err(db_error)?;
            summary.configs += 1;
        }

        tx.commit().map_err(db_error)?;
        Ok(summary)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }
}

impl SessionSource for SqliteStore {
    fn begin(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        let connection = self.lock()?;
        connection.execute_batch("BEGIN IMMEDIATE").map_err(db_error)?;
        Ok(Box::new(SqliteSession {
            connection,
            open: true,
        }))
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// One `BEGIN IMMEDIATE` transaction on the shared connection.
struct SqliteSession<'a> {
    /// Locked connection.
    connection: MutexGuard<'a, Connection>,
    /// True until the transaction has been committed or rolled back.
    open: bool,
}

impl Drop for SqliteSession<'_> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.connection.execute_batch("ROLLBACK");
        }
    }
}

impl StoreSession for SqliteSession<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.connection.execute_batch("COMMIT").map_err(db_error)?;
        self.open = false;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<(), StoreError> {
        self.open = false;
        self.connection.execute_batch("ROLLBACK").map_err(db_error)?;
        Ok(())
    }
}

impl ReferenceCatalog for SqliteSession<'_> {
    fn machine_exists(&self, machine: &Machine) -> Result<bool, CatalogError> {
        let found = self
            .connection
            .query_row(
                "SELECT 1 FROM machines WHERE name = ?1 AND architecture = ?2",
                params![machine.name, machine.architecture],
                |_| Ok(()),
            )
            .optional()
            .map_err(db_error)?;
        Ok(found.is_some())
    }

    fn resolve_product(&self, product: &Product) -> Result<Option<CommitHash>, CatalogError> {
        if product.commit.is_empty() {
            return Ok(None);
        }
        let mut stmt = self
            .connection
            .prepare(
                "SELECT hash FROM commits
                 WHERE product = ?1 AND substr(hash, 1, length(?2)) = ?2",
            )
            .map_err(db_error)?;
        let candidates = stmt
            .query_map(params![product.name, product.commit], |row| row.get::<_, String>(0))
            .map_err(db_error)?
            .map(|row| row.map(CommitHash::new))
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(resolve_commit(&candidates, &product.commit))
    }

    fn benchmark_catalog(&self) -> Result<BTreeSet<BenchmarkName>, CatalogError> {
        let mut stmt = self.connection.prepare("SELECT name FROM benchmarks").map_err(db_error)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_error)?
            .map(|row| row.map(BenchmarkName::new))
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(db_error)?;
        Ok(names)
    }

    fn metric_catalog(&self) -> Result<BTreeMap<MetricName, MetricKind>, CatalogError> {
        let mut stmt =
            self.connection.prepare("SELECT name, result_type FROM metrics").map_err(db_error)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        let mut metrics = BTreeMap::new();
        for (name, label) in rows {
            let kind = MetricKind::from_label(&label).ok_or_else(|| {
                CatalogError::Corrupt(format!("metric {name} has unknown result type {label}"))
            })?;
            metrics.insert(MetricName::new(name), kind);
        }
        Ok(metrics)
    }

    fn config_exists(&self, config: &Config) -> Result<bool, CatalogError> {
        let Some(stored) = load_config(&self.connection, &config.name)? else {
            return Ok(false);
        };
        Ok(stored == *config)
    }
}

impl RunSetStore for SqliteSession<'_> {
    fn insert_run_set(&mut self, run_set: &RunSet) -> Result<RunSetId, StoreError> {
        self.connection
            .execute(
                "INSERT INTO run_sets (
                    started_at, finished_at, build_url, log_urls,
                    main_product, main_commit, secondary_products,
                    machine, machine_architecture, config, config_mono_executable,
                    config_mono_environment_variables, config_mono_options,
                    timed_out_benchmarks, crashed_benchmarks
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    format_timestamp(run_set.started_at)?,
                    format_timestamp(run_set.finished_at)?,
                    run_set.build_url,
                    encode_json(&run_set.log_urls)?,
                    run_set.main_product.name,
                    run_set.main_product.commit,
                    encode_json(&run_set.secondary_products)?,
                    run_set.machine.name,
                    run_set.machine.architecture,
                    run_set.config.name,
                    run_set.config.mono_executable,
                    encode_json(&run_set.config.mono_environment_variables)?,
                    encode_json(&run_set.config.mono_options)?,
                    encode_json(&run_set.timed_out_benchmarks)?,
                    encode_json(&run_set.crashed_benchmarks)?,
                ],
            )
            .map_err(db_error)?;
        let raw = self.connection.last_insert_rowid();
        let id = i32::try_from(raw).map_err(|_| {
            SqliteStoreError::Invalid(format!("run set id {raw} exceeds 32-bit range"))
        })?;
        Ok(RunSetId::new(id))
    }

    fn insert_runs(&mut self, id: RunSetId, runs: &[Run]) -> Result<(), StoreError> {
        let mut stmt = self
            .connection
            .prepare("INSERT INTO runs (run_set_id, benchmark, results) VALUES (?1, ?2, ?3)")
            .map_err(db_error)?;
        for run in runs {
            stmt.execute(params![id.get(), run.benchmark.as_str(), encode_json(&run.results)?])
                .map_err(db_error)?;
        }
        Ok(())
    }

    fn fetch_run_set(&self, id: RunSetId) -> Result<Option<RunSet>, StoreError> {
        let row = self
            .connection
            .query_row(
                "SELECT started_at, finished_at, build_url, log_urls, main_product, main_commit,
                        secondary_products, machine, machine_architecture, config,
                        config_mono_executable, config_mono_environment_variables,
                        config_mono_options, timed_out_benchmarks, crashed_benchmarks
                 FROM run_sets WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok(RunSetRow {
                        started_at: row.get(0)?,
                        finished_at: row.get(1)?,
                        build_url: row.get(2)?,
                        log_urls: row.get(3)?,
                        main_product: row.get(4)?,
                        main_commit: row.get(5)?,
                        secondary_products: row.get(6)?,
                        machine: row.get(7)?,
                        architecture: row.get(8)?,
                        config: row.get(9)?,
                        mono_executable: row.get(10)?,
                        mono_environment_variables: row.get(11)?,
                        mono_options: row.get(12)?,
                        timed_out_benchmarks: row.get(13)?,
                        crashed_benchmarks: row.get(14)?,
                    })
                },
            )
            .optional()
            .map_err(db_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut stmt = self
            .connection
            .prepare("SELECT benchmark, results FROM runs WHERE run_set_id = ?1 ORDER BY id")
            .map_err(db_error)?;
        let raw_runs = stmt
            .query_map(params![id.get()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        let runs = raw_runs
            .into_iter()
            .map(|(benchmark, results)| {
                Ok(Run {
                    benchmark: BenchmarkName::new(benchmark),
                    results: decode_json(&results)?,
                })
            })
            .collect::<Result<Vec<_>, SqliteStoreError>>()?;

        Ok(Some(RunSet {
            started_at: parse_timestamp(&row.started_at)?,
            finished_at: parse_timestamp(&row.finished_at)?,
            build_url: row.build_url,
            log_urls: decode_json(&row.log_urls)?,
            main_product: Product {
                name: row.main_product,
                commit: row.main_commit,
            },
            secondary_products: decode_json(&row.secondary_products)?,
            machine: Machine {
                name: row.machine,
                architecture: row.architecture,
            },
            config: Config {
                name: row.config,
                mono_executable: row.mono_executable,
                mono_environment_variables: decode_json(&row.mono_environment_variables)?,
                mono_options: decode_json(&row.mono_options)?,
            },
            timed_out_benchmarks: decode_json(&row.timed_out_benchmarks)?,
            crashed_benchmarks: decode_json(&row.crashed_benchmarks)?,
            runs,
        }))
    }

    fn update_run_set(&mut self, id: RunSetId, run_set: &RunSet) -> Result<(), StoreError> {
        let updated = self
            .connection
            .execute(
                "UPDATE run_sets SET
                    finished_at = ?1, build_url = ?2, log_urls = ?3,
                    timed_out_benchmarks = ?4, crashed_benchmarks = ?5
                 WHERE id = ?6",
                params![
                    format_timestamp(run_set.finished_at)?,
                    run_set.build_url,
                    encode_json(&run_set.log_urls)?,
                    encode_json(&run_set.timed_out_benchmarks)?,
                    encode_json(&run_set.crashed_benchmarks)?,
                    id.get(),
                ],
            )
            .map_err(db_error)?;
        if updated == 0 {
            return Err(StoreError::Store(format!("run set {id} not found")));
        }
        Ok(())
    }
}

/// Raw run set header columns.
struct RunSetRow {
    /// RFC 3339 start time.
    started_at: String,
    /// RFC 3339 finish time.
    finished_at: String,
    /// Optional build URL.
    build_url: Option<String>,
    /// JSON array of log URLs.
    log_urls: String,
    /// Main product name.
    main_product: String,
    /// Main product full commit hash.
    main_commit: String,
    /// JSON array of secondary products.
    secondary_products: String,
    /// Machine name.
    machine: String,
    /// Machine architecture at insert time.
    architecture: String,
    /// Config name.
    config: String,
    /// Mono executable at insert time.
    mono_executable: String,
    /// JSON object of Mono environment variables at insert time.
    mono_environment_variables: String,
    /// JSON array of Mono options at insert time.
    mono_options: String,
    /// JSON array of timed-out benchmarks.
    timed_out_benchmarks: String,
    /// JSON array of crashed benchmarks.
    crashed_benchmarks: String,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads a catalog config by name.
fn load_config(connection: &Connection, name: &str) -> Result<Option<Config>, SqliteStoreError> {
    let row = connection
        .query_row(
            "SELECT mono_executable, mono_environment_variables, mono_options
             FROM configs WHERE name = ?1",
            params![name],
            |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            },
        )
        .optional()
        .map_err(db_error)?;
    let Some((mono_executable, environment, options)) = row else {
        return Ok(None);
    };
    Ok(Some(Config {
        name: name.to_string(),
        mono_executable,
        mono_environment_variables: decode_json(&environment)?,
        mono_options: decode_json(&options)?,
    }))
}

/// Encodes a value as a JSON column.
fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, SqliteStoreError> {
    serde_json::to_string(value).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Decodes a JSON column.
fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, SqliteStoreError> {
    serde_json::from_str(text).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
}

/// Formats a timestamp column.
fn format_timestamp(value: OffsetDateTime) -> Result<String, SqliteStoreError> {
    value.format(&Rfc3339).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Parses a timestamp column.
fn parse_timestamp(text: &str) -> Result<OffsetDateTime, SqliteStoreError> {
    OffsetDateTime::parse(text, &Rfc3339).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS machines (
                    name TEXT PRIMARY KEY,
                    architecture TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS products (
                    name TEXT PRIMARY KEY
                );
                CREATE TABLE IF NOT EXISTS commits (
                    product TEXT NOT NULL REFERENCES products(name),
                    hash TEXT NOT NULL,
                    PRIMARY KEY (product, hash)
                );
                CREATE TABLE IF NOT EXISTS benchmarks (
                    name TEXT PRIMARY KEY
                );
                CREATE TABLE IF NOT EXISTS metrics (
                    name TEXT PRIMARY KEY,
                    result_type TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS configs (
                    name TEXT PRIMARY KEY,
                    mono_executable TEXT NOT NULL,
                    mono_environment_variables TEXT NOT NULL,
                    mono_options TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS run_sets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    started_at TEXT NOT NULL,
                    finished_at TEXT NOT NULL,
                    build_url TEXT,
                    log_urls TEXT NOT NULL,
                    main_product TEXT NOT NULL,
                    main_commit TEXT NOT NULL,
                    secondary_products TEXT NOT NULL,
                    machine TEXT NOT NULL REFERENCES machines(name),
                    machine_architecture TEXT NOT NULL,
                    config TEXT NOT NULL REFERENCES configs(name),
                    config_mono_executable TEXT NOT NULL,
                    config_mono_environment_variables TEXT NOT NULL,
                    config_mono_options TEXT NOT NULL,
                    timed_out_benchmarks TEXT NOT NULL,
                    crashed_benchmarks TEXT NOT NULL,
                    FOREIGN KEY (main_product, main_commit) REFERENCES commits(product, hash)
                );
                CREATE TABLE IF NOT EXISTS runs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    run_set_id INTEGER NOT NULL REFERENCES run_sets(id),
                    benchmark TEXT NOT NULL REFERENCES benchmarks(name),
                    results TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_runs_run_set_id ON runs (run_set_id, id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
