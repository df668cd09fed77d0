// crates/benchmarker-http/tests/http_end_to_end.rs
// ============================================================================
// Module: HTTP End-to-End Tests
// Description: Requests over a loopback socket against a SQLite store.
// Purpose: Validate status codes, bodies, and store effects on the wire.
// ============================================================================

//! ## Overview
//! Binds the ingest router to an ephemeral loopback port, seeds a temporary
//! `SQLite` store with the example catalog, and drives it with `reqwest`.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use benchmarker_config::parse_reference_data;
use benchmarker_config::seed_toml_example;
use benchmarker_core::BenchmarkName;
use benchmarker_core::RunSetId;
use benchmarker_core::RunSetStore;
use benchmarker_core::SessionSource;
use benchmarker_core::SharedSessionSource;
use benchmarker_http::RequestAuditEvent;
use benchmarker_http::RequestAuditSink;
use benchmarker_http::RequestOutcome;
use benchmarker_http::ServerState;
use benchmarker_http::serve_listener;
use benchmarker_store_sqlite::SqliteStore;
use benchmarker_store_sqlite::SqliteStoreConfig;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;

// ============================================================================
// SECTION: Harness
// ============================================================================

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<RequestAuditEvent>>,
}

impl RequestAuditSink for RecordingSink {
    fn record(&self, event: &RequestAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct Harness {
    _dir: TempDir,
    base: String,
    store: SqliteStore,
    audit: Arc<RecordingSink>,
    client: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::new(&SqliteStoreConfig::new(dir.path().join("ingest.sqlite")))
            .unwrap();
        store.import_reference_data(&parse_reference_data(&seed_toml_example()).unwrap()).unwrap();
        let audit = Arc::new(RecordingSink::default());
        let source: SharedSessionSource = Arc::new(store.clone());
        let state = ServerState::new(source, audit.clone(), 1024 * 1024);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_listener(listener, state));
        Self {
            _dir: dir,
            base: format!("http://{addr}"),
            store,
            audit,
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base))
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        Self::decode(response).await
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(format!("{}{path}", self.base)).send().await.unwrap();
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> (u16, Value) {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let text = response.text().await.unwrap();
        (status, serde_json::from_str(&text).unwrap())
    }

    fn run_set_exists(&self, id: i32) -> bool {
        let session = self.store.begin().unwrap();
        let found = RunSetStore::fetch_run_set(&*session, RunSetId::new(id)).unwrap().is_some();
        session.rollback().unwrap();
        found
    }

    fn outcomes(&self) -> Vec<(u16, RequestOutcome)> {
        self.audit.events.lock().unwrap().iter().map(|event| (event.status, event.outcome)).collect()
    }
}

fn submission() -> Value {
    json!({
        "StartedAt": "2016-05-01T10:00:00Z",
        "FinishedAt": "2016-05-01T11:00:00Z",
        "BuildURL": "https://ci.example/job/7",
        "LogURLs": ["https://logs.example/7"],
        "MainProduct": {"Name": "mono", "Commit": "0123456789abcdef"},
        "SecondaryProducts": [{"Name": "llvm", "Commit": "aaaa1111"}],
        "Machine": {"Name": "bench-01", "Architecture": "amd64"},
        "Config": {
            "Name": "default",
            "MonoExecutable": "mono",
            "MonoEnvironmentVariables": {"MONO_GC": "sgen"},
            "MonoOptions": ["--llvm"]
        },
        "TimedOutBenchmarks": ["binarytrees"],
        "Runs": [{"Benchmark": "nbody", "Results": {"time": [1.5, 1.6]}}]
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn create_then_amend_over_http() {
    let harness = Harness::start().await;

    let (status, body) = harness.post("/runset", &submission()).await;
    assert_eq!(status, 201);
    assert_eq!(body, json!({"RunSetID": 1}));

    let mut amendment = submission();
    amendment["Runs"] =
        json!([{"Benchmark": "binarytrees", "Results": {"memory-integral": 12.5}}]);
    amendment["TimedOutBenchmarks"] = json!([]);
    let (status, body) = harness.post("/runset/1", &amendment).await;
    assert_eq!(status, 201);
    assert_eq!(body, json!({}));

    let session = harness.store.begin().unwrap();
    let stored = RunSetStore::fetch_run_set(&*session, RunSetId::new(1)).unwrap().unwrap();
    session.rollback().unwrap();
    assert_eq!(stored.runs.len(), 2);
    assert_eq!(stored.runs[1].benchmark, BenchmarkName::from("binarytrees"));
    assert!(stored.timed_out_benchmarks.is_empty());

    assert_eq!(
        harness.outcomes(),
        vec![(201, RequestOutcome::Committed), (201, RequestOutcome::Committed)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_method_is_405_and_writes_nothing() {
    let harness = Harness::start().await;
    let (status, body) = harness.get("/runset").await;
    assert_eq!(status, 405);
    assert_eq!(body, json!({"Explanation": "Only POST method allowed"}));
    assert!(!harness.run_set_exists(1));
    assert_eq!(harness.outcomes(), vec![(405, RequestOutcome::Rejected)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_path_is_404() {
    let harness = Harness::start().await;
    let (status, body) = harness.get("/foo").await;
    assert_eq!(status, 404);
    assert_eq!(body, json!({"Explanation": "No such endpoint"}));
    let (status, _) = harness.post("/foo", &submission()).await;
    assert_eq!(status, 404);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_amend_paths_are_400() {
    let harness = Harness::start().await;
    let (status, body) = harness.post("/runset/notanumber", &submission()).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"Explanation": "Could not parse run set id"}));
    let (status, body) = harness.post("/runset/1/extra", &submission()).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"Explanation": "Incorrect path"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_benchmark_rolls_back_the_create() {
    let harness = Harness::start().await;
    let mut body = submission();
    body["Runs"] = json!([{"Benchmark": "spectralnorm", "Results": {"time": [1.0]}}]);
    let (status, reply) = harness.post("/runset", &body).await;
    assert_eq!(status, 400);
    assert!(reply["Explanation"].as_str().unwrap().contains("spectralnorm"));
    assert!(!harness.run_set_exists(1));
    assert_eq!(harness.outcomes(), vec![(400, RequestOutcome::RolledBack)]);
}
