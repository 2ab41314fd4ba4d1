#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use exam_hero_api::config::{AppConfig, StoreBackend};
use exam_hero_api::database::MemoryStore;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The full application served over TCP on the in-memory store.
///
/// Runs on its own thread and runtime so it outlives individual
/// `#[tokio::test]` runtimes and ends with the test process.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = std::net::TcpListener::bind(("127.0.0.1", port)).context("failed to bind test port")?;
        listener.set_nonblocking(true)?;

        std::thread::Builder::new()
            .name("exam-hero-test-server".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .expect("test server runtime");
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener).expect("test listener");
                    let app = exam_hero_api::app(Arc::new(MemoryStore::new()), &memory_config());
                    axum::serve(listener, app).await.expect("test server");
                });
            })
            .context("failed to start test server thread")?;

        Ok(Self { port, base_url })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to start test server"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn memory_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = StoreBackend::Memory;
    config.api.enable_request_logging = false;
    config
}

/// Router over a fresh in-memory store, driven without a socket
pub struct TestApp {
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(&memory_config())
    }

    pub fn with_config(config: &AppConfig) -> Self {
        let router = exam_hero_api::app(Arc::new(MemoryStore::new()), config);
        Self { router }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.dispatch(request).await
    }

    /// Send a raw string body labelled as JSON
    pub async fn send_raw(&self, method: &str, uri: &str, body: impl Into<String>) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.into()))
            .expect("request");
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.send("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    /// POST and return the inserted id
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let res = self.post(uri, body).await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
        res.body["result"]["insertedId"]
            .as_str()
            .expect("insertedId")
            .to_string()
    }
}
