//! Shared setup for the integration tests
//!
//! Every test gets its own RocksDB directory and a fully seeded state.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use siaf_server::api::build_app;
use siaf_server::db::DbService;
use siaf_server::{Config, ServerState};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "Admin2025x";

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_testing(dir.path().to_string_lossy()).unwrap();
        adjust(&mut config);

        let db = DbService::open(&config.database_dir()).await.unwrap().db;
        let state = ServerState::with_db(config, db).await.unwrap();
        let router = build_app(&state).with_state(state.clone());

        Self {
            state,
            router,
            _dir: dir,
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    /// POST a raw JSON text body, bypassing `serde_json::Value`
    pub async fn post_raw(&self, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send_request(request).await
    }

    /// Login attempt arriving from socket `peer` with a client-chosen `X-Forwarded-For`
    pub async fn login_from(
        &self,
        peer: SocketAddr,
        forwarded_for: &str,
        username: &str,
        password: &str,
    ) -> StatusCode {
        let mut request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::from(
                serde_json::json!({ "username": username, "password": password }).to_string(),
            ))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        self.send_request(request).await.0
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Register a `user` role account and return its id and token
    pub async fn regular_user(&self, admin_token: &str, username: &str) -> (String, String) {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/register",
                Some(admin_token),
                Some(serde_json::json!({
                    "username": username,
                    "password": "Usuario2025x",
                    "full_name": "Usuario de Prueba",
                    "role": "user",
                    "department": "MANTENIMIENTO",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["id"].as_str().unwrap().to_string();
        let token = self.login(username, "Usuario2025x").await;
        (id, token)
    }

    /// Wait for the audit worker to drain its queue
    pub async fn settle_audit(&self) {
        for _ in 0..50 {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            let (_, total) = self
                .state
                .audit_service
                .query(&Default::default())
                .await
                .unwrap();
            if total > 0 {
                break;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
}
