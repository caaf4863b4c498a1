//! Common test utilities for E2E tests

use tokio::net::TcpListener;
use trandaiz::{config, AppState};

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create test configuration. Argon2 cost is lowered so account
        // registration stays fast in tests.
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            auth: config::AuthConfig {
                jwt_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                token_ttl_seconds: 3600,
                hash_memory_kib: 1024,
                hash_iterations: 1,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).unwrap();

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = trandaiz::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Get the WebSocket URL for the real-time channel
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.addr.replacen("http://", "ws://", 1))
    }

    /// Register an account and return its id
    pub async fn register(&self, username: &str, email: &str, password: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("register request succeeds");
        assert_eq!(response.status(), 201, "registration should succeed");

        let body: serde_json::Value = response.json().await.expect("register response body");
        body["user"]["id"].as_i64().expect("registered user id")
    }

    /// Log in and return the bearer token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("login request succeeds");
        assert_eq!(response.status(), 200, "login should succeed");

        let body: serde_json::Value = response.json().await.expect("login response body");
        body["token"].as_str().expect("login token").to_string()
    }

    /// Register and log in a fresh account, returning (id, token)
    pub async fn register_and_login(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> (i64, String) {
        let id = self.register(username, email, password).await;
        let token = self.login(email, password).await;
        (id, token)
    }
}
