//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a real SQLite store, a running worker pool and mock provider
//! collaborators, so jobs run end to end without network access.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use flock_core::{
    load_config_from_str,
    testing::{MockFlightProvider, MockLocationResolver},
    ChannelJobQueue, JobContext, JobController, JobQueue, JobStore, SearchSettings,
    SqliteJobStore, WorkerPool,
};
use flock_server::state::AppState;

/// Re-export fixtures for test convenience
pub use flock_core::testing::fixtures;

const TEST_CONFIG: &str = r#"
[server]
port = 8080
cors_allowed_origins = ["http://localhost:3000"]

[provider]
backend = "amadeus"

[provider.amadeus]
client_id = "test-client"
client_secret = "super-secret-value"

[worker]
concurrency = 2
queue_capacity = 16
"#;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_job_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post("/api/v1/jobs", fixtures::submission_json(&[("Ana", "JFK")], &["CUN"]))
///         .await;
///
///     assert_eq!(response.status, StatusCode::CREATED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Job store shared with the router and workers
    pub store: Arc<SqliteJobStore>,
    /// Mock flight provider - configure offers per route
    pub provider: Arc<MockFlightProvider>,
    /// Mock location resolver - configure destination names
    pub resolver: Arc<MockLocationResolver>,
    /// Worker pool draining the queue (None when the queue is closed)
    pub pool: Option<WorkerPool>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with a running worker pool.
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Create a fixture whose queue refuses every job.
    pub async fn with_closed_queue() -> Self {
        Self::build(false).await
    }

    async fn build(run_workers: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let mut config = load_config_from_str(TEST_CONFIG).expect("Failed to parse test config");
        config.database.path = db_path.clone();

        // Create mocks
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());

        let store = Arc::new(SqliteJobStore::new(&db_path).expect("Failed to create job store"));

        let controller = Arc::new(JobController::new(JobContext {
            store: Arc::clone(&store) as Arc<dyn JobStore>,
            provider: Arc::clone(&provider) as Arc<dyn flock_core::FlightSearchProvider>,
            resolver: Arc::clone(&resolver) as Arc<dyn flock_core::LocationResolver>,
            search: SearchSettings {
                max_parallel_searches: 2,
                provider_timeout: Duration::from_secs(2),
            },
        }));

        let (queue, receiver) = ChannelJobQueue::new(config.worker.queue_capacity);

        let pool = if run_workers {
            let pool = WorkerPool::new(controller, receiver, config.worker.concurrency);
            pool.start().await;
            Some(pool)
        } else {
            // Dropping the receiver closes the channel
            drop(receiver);
            None
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn JobStore>,
            Arc::new(queue) as Arc<dyn JobQueue>,
        ));

        let router = flock_server::api::create_router(state);

        Self {
            router,
            store,
            provider,
            resolver,
            pool,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Poll a job until it reaches a terminal status and return its view.
    pub async fn wait_for_job(&self, job_id: &str) -> Value {
        for _ in 0..300 {
            let response = self.get(&format!("/api/v1/jobs/{}", job_id)).await;
            let status = response.body["status"].as_str().unwrap_or_default().to_string();
            if status == "complete" || status == "failed" {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
