use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use plantops_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Helper harness for spinning up an application state backed by a
/// file-based SQLite database in a temporary directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("failed to create temp dir for test database");
        let db_path = db_dir.path().join("plantops_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // A single connection keeps SQLite transactions serialized.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = plantops_api::app_router(state.clone());

        Self {
            router,
            state,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Send a request against the router, optionally with a JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper returning the status and decoded JSON body.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be valid JSON")
        };
        (status, value)
    }

    /// Seed a customer and return its ID.
    #[allow(dead_code)]
    pub async fn seed_customer(&self, name: &str) -> i32 {
        let (status, body) = self
            .request_json(
                Method::POST,
                "/api/v1/customers",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed customer failed: {body}");
        id_of(&body)
    }

    /// Seed an order for a customer and return its ID.
    #[allow(dead_code)]
    pub async fn seed_order(&self, customer_id: i32) -> i32 {
        let (status, body) = self
            .request_json(
                Method::POST,
                "/api/v1/orders",
                Some(json!({ "customer_id": customer_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed order failed: {body}");
        id_of(&body)
    }

    /// Seed a job order with the given ordered quantity and return its ID.
    #[allow(dead_code)]
    pub async fn seed_job_order(&self, order_id: i32, quantity: i64) -> i32 {
        let (status, body) = self
            .request_json(
                Method::POST,
                "/api/v1/job-orders",
                Some(json!({ "order_id": order_id, "quantity": quantity })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed job order failed: {body}");
        id_of(&body)
    }

    /// Seed a material (zero starting balance unless given) and return its ID.
    #[allow(dead_code)]
    pub async fn seed_material(&self, name: &str, starting_balance_kg: Option<i64>) -> i32 {
        let mut payload = json!({ "name": name });
        if let Some(starting) = starting_balance_kg {
            payload["starting_balance_kg"] = json!(starting);
        }
        let (status, body) = self
            .request_json(Method::POST, "/api/v1/materials", Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed material failed: {body}");
        id_of(&body)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Extract the integer `id` field of a JSON object.
pub fn id_of(body: &Value) -> i32 {
    body["id"].as_i64().expect("response should carry an id") as i32
}

/// Read a decimal field regardless of whether it was serialized as a JSON
/// string or number.
#[allow(dead_code)]
pub fn decimal_field(body: &Value, key: &str) -> Decimal {
    match &body[key] {
        Value::String(s) => s.parse().unwrap_or_else(|_| panic!("field {key} should parse as decimal: {s}")),
        Value::Number(n) => n
            .to_string()
            .parse()
            .unwrap_or_else(|_| panic!("field {key} should parse as decimal: {n}")),
        other => panic!("field {key} is not a decimal value: {other}"),
    }
}
