//! Shared harness: an in-memory Study Hub and a cookie-keeping client

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
    response::Response,
};
use hub::{
    password::{PasswordHasher, PasswordHasherConfig},
    repositories::memory::{MemoryMaterialStore, MemoryMessageStore, MemoryUserStore},
    routes::create_router,
    session::MemorySessionStore,
    state::{AppState, Stores},
    uploads::{DEFAULT_ALLOWED_EXTENSIONS, UploadStore},
};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "----study-hub-test-boundary";

pub fn test_state(upload_dir: &std::path::Path) -> AppState {
    let stores = Stores {
        users: Arc::new(MemoryUserStore::new()),
        messages: Arc::new(MemoryMessageStore::new()),
        materials: Arc::new(MemoryMaterialStore::new()),
        sessions: Arc::new(MemorySessionStore::new()),
    };
    let hasher = PasswordHasher::new(PasswordHasherConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let uploads = UploadStore::new(
        upload_dir.join("study_materials"),
        DEFAULT_ALLOWED_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect(),
    );

    AppState::new(stores, hasher, uploads, "test-secret", 3600, 1024 * 1024)
}

/// A browser stand-in that replays the cookies the server sets
pub struct TestClient {
    app: Router,
    cookies: HashMap<String, String>,
    pub state: AppState,
    pub upload_root: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

impl TestClient {
    pub fn new() -> Self {
        let upload_root = TempDir::new().unwrap();
        let state = test_state(upload_root.path());
        Self {
            app: create_router(state.clone()),
            cookies: HashMap::new(),
            state,
            upload_root,
        }
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Drop every cookie without telling the server, like a second browser.
    pub fn forget_cookies(&mut self) {
        self.cookies.clear();
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let mut request = request;
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response: Response = self.app.clone().oneshot(request).await.unwrap();
        self.remember_cookies(response.headers());

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn remember_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let removed = value.is_empty() || raw.contains("Max-Age=0");
            if removed {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Upload through the hub form. `field` is normally `study_file`.
    pub async fn upload(&mut self, field: &str, filename: &str, bytes: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/study-hub")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> TestResponse {
        self.post_form(
            "/register",
            &[("email", email), ("password", password), ("name", name)],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }
}
