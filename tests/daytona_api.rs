//! Integration tests for the Daytona client and the sandbox script.
//!
//! An Axum server on a random port stands in for the Daytona API and logs
//! every call so ordering can be asserted.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use note_bot::channels::Transcript;
use note_bot::config::SandboxConfig;
use note_bot::error::{Error, SandboxError};
use note_bot::sandbox::{
    CreateSandboxParams, DaytonaClient, RepoSpec, SandboxProvider, SandboxScript, Step,
};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct MockDaytona {
    log: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    /// GET polls answered with "creating" before reporting "started".
    pending_polls: Arc<AtomicU32>,
    /// Final state reported by GET.
    final_state: Arc<Mutex<String>>,
}

impl MockDaytona {
    fn record(&self, headers: &HeaderMap, entry: String) {
        assert_eq!(headers["authorization"], "Bearer dtn_test");
        self.log.lock().unwrap().push(entry);
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

async fn create(
    State(api): State<MockDaytona>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    api.record(&headers, "create".into());
    api.bodies.lock().unwrap().push(body);
    Json(json!({"id": "sb-42", "state": "creating"}))
}

async fn fetch(
    State(api): State<MockDaytona>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Json<Value> {
    api.record(&headers, format!("get {id}"));
    let state = if api
        .pending_polls
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        "creating".to_string()
    } else {
        api.final_state.lock().unwrap().clone()
    };
    Json(json!({"id": id, "state": state}))
}

async fn remove(
    State(api): State<MockDaytona>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> StatusCode {
    api.record(&headers, format!("delete {id}"));
    StatusCode::OK
}

async fn git_clone(
    State(api): State<MockDaytona>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    api.record(&headers, format!("clone {id} {}", body["url"].as_str().unwrap_or("")));
    api.bodies.lock().unwrap().push(body);
    StatusCode::OK
}

async fn execute(
    State(api): State<MockDaytona>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let command = body["command"].as_str().unwrap_or("").to_string();
    api.record(&headers, format!("exec {id} {command}"));
    api.bodies.lock().unwrap().push(body);
    if command.contains("missing-script") {
        Json(json!({"exitCode": 1, "result": "npm ERR! missing script"}))
    } else {
        Json(json!({"exitCode": 0, "result": format!("ran {command}\n")}))
    }
}

async fn start_server(api: MockDaytona) -> String {
    let app = Router::new()
        .route("/api/sandbox", post(create))
        .route("/api/sandbox/{id}", get(fetch).delete(remove))
        .route("/api/toolbox/{id}/toolbox/git/clone", post(git_clone))
        .route("/api/toolbox/{id}/toolbox/process/execute", post(execute))
        .with_state(api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{port}/api")
}

fn config(api_url: String) -> SandboxConfig {
    SandboxConfig {
        api_key: SecretString::from("dtn_test"),
        api_url,
        target: Some("us".into()),
        start_timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(10),
    }
}

fn mock(pending_polls: u32, final_state: &str) -> MockDaytona {
    MockDaytona {
        pending_polls: Arc::new(AtomicU32::new(pending_polls)),
        final_state: Arc::new(Mutex::new(final_state.to_string())),
        ..MockDaytona::default()
    }
}

#[tokio::test]
async fn create_polls_until_started() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(2, "started");
        let client = DaytonaClient::new(config(start_server(api.clone()).await));

        let info = client
            .create(&CreateSandboxParams::default().with_language("python"))
            .await
            .unwrap();
        assert_eq!(info.id, "sb-42");
        assert_eq!(info.state.as_deref(), Some("started"));
        assert_eq!(api.log(), vec!["create", "get sb-42", "get sb-42", "get sb-42"]);

        let body = api.bodies.lock().unwrap()[0].clone();
        assert_eq!(body["target"], "us");
        assert_eq!(body["labels"]["code-toolbox-language"], "python");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn create_reports_failed_state() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(0, "error");
        let client = DaytonaClient::new(config(start_server(api.clone()).await));

        let err = client
            .create(&CreateSandboxParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Failed { ref state, .. } if state == "error"));
        assert_eq!(api.log(), vec!["create", "get sb-42", "delete sb-42"]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn create_times_out_when_never_started() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(u32::MAX, "started");
        let mut cfg = config(start_server(api.clone()).await);
        cfg.start_timeout = Duration::from_millis(50);
        let client = DaytonaClient::new(cfg);

        let err = client
            .create(&CreateSandboxParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::StartTimeout { ref id, .. } if id == "sb-42"));
        assert_eq!(api.log().last().map(String::as_str), Some("delete sb-42"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn api_errors_carry_status() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(0, "started");
        let client = DaytonaClient::new(config(start_server(api).await));

        // No route for this path, so axum answers 404.
        let err = client.get("sb-42/extra").await.unwrap_err();
        assert!(matches!(err, SandboxError::Api { status: 404, .. }));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn repository_script_runs_in_order_and_deletes_last() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(0, "started");
        let client = Arc::new(DaytonaClient::new(config(start_server(api.clone()).await)));

        let script = SandboxScript::new(CreateSandboxParams::default())
            .with_repository(RepoSpec {
                url: "https://github.com/example/app.git".into(),
                branch: "main".into(),
                path: "workspace/repo".into(),
            })
            .with_step(Step::Command("npm run missing-script".into()))
            .with_step(Step::Command("ls".into()));

        let mut transcript = Transcript::new();
        let report = script.run(client, &mut transcript).await.unwrap();

        assert_eq!(report.sandbox_id, "sb-42");
        assert_eq!(report.failures(), 1);
        assert_eq!(
            api.log(),
            vec![
                "create",
                "get sb-42",
                "clone sb-42 https://github.com/example/app.git",
                "exec sb-42 npm run missing-script",
                "exec sb-42 ls",
                "delete sb-42",
            ]
        );
        assert_eq!(
            transcript.as_str(),
            "Error: 1 npm ERR! missing script\nran ls\n"
        );

        let bodies = api.bodies.lock().unwrap().clone();
        let clone = &bodies[1];
        assert_eq!(clone["branch"], "main");
        assert_eq!(clone["path"], "workspace/repo");
        assert_eq!(bodies[2]["cwd"], "workspace/repo");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn hello_world_script_runs_python() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(0, "started");
        let client = Arc::new(DaytonaClient::new(config(start_server(api.clone()).await)));

        let mut transcript = Transcript::new();
        let report = SandboxScript::hello_world(CreateSandboxParams::default())
            .run(client, &mut transcript)
            .await
            .unwrap();

        assert_eq!(report.failures(), 0);
        let log = api.log();
        assert_eq!(log.len(), 4);
        assert!(log[2].starts_with("exec sb-42 python3 -c 'print(\"Hello World from code!\")'"));
        assert_eq!(log[3], "delete sb-42");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn sandbox_that_fails_to_start_is_deleted() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(0, "build_failed");
        let client = Arc::new(DaytonaClient::new(config(start_server(api.clone()).await)));

        let mut transcript = Transcript::new();
        let err = SandboxScript::hello_world(CreateSandboxParams::default())
            .run(client, &mut transcript)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Sandbox(SandboxError::Failed { .. })));
        assert_eq!(api.log(), vec!["create", "get sb-42", "delete sb-42"]);
        assert!(transcript.as_str().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn sandbox_that_never_starts_is_deleted_once() {
    timeout(TEST_TIMEOUT, async {
        let api = mock(u32::MAX, "started");
        let mut cfg = config(start_server(api.clone()).await);
        cfg.start_timeout = Duration::from_millis(50);
        let client = Arc::new(DaytonaClient::new(cfg));

        let mut transcript = Transcript::new();
        let err = SandboxScript::hello_world(CreateSandboxParams::default())
            .run(client, &mut transcript)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Sandbox(SandboxError::StartTimeout { ref id, .. }) if id == "sb-42"
        ));
        let log = api.log();
        let deletes: Vec<_> = log.iter().filter(|e| e.starts_with("delete")).collect();
        assert_eq!(deletes, vec!["delete sb-42"]);
        assert_eq!(log.last().map(String::as_str), Some("delete sb-42"));
        assert!(!log.iter().any(|e| e.starts_with("exec")));
    })
    .await
    .expect("test timed out");
}
