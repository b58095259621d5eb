//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

/// Process environment is global; tests touching it take this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Restores the saved variables on drop, including during a panic.
struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// Run `f` with the given variables set (`Some`) or removed (`None`).
pub fn with_scoped_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut guard = EnvGuard { saved: Vec::new() };
    for (key, value) in vars {
        if !guard.saved.iter().any(|(saved, _)| saved == key) {
            guard.saved.push((key.to_string(), std::env::var(key).ok()));
        }
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    f()
}

/// Drive a future to completion on a fresh current-thread runtime.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build test runtime")
        .block_on(future)
}

#[cfg(feature = "http-server")]
pub mod http {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use exercise_tracker::db::{FullRepository, LocalRepository};
    use exercise_tracker::http::{create_router, AppState};

    /// Router over a fresh in-memory repository, plus a handle to that repository.
    pub fn app() -> (Router, Arc<LocalRepository>) {
        let repo = Arc::new(LocalRepository::new());
        let router = app_with(repo.clone());
        (router, repo)
    }

    pub fn app_with(repo: Arc<dyn FullRepository>) -> Router {
        create_router(AppState::new(repo))
    }

    /// Send one request and decode the JSON body (`Null` when not JSON).
    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("invalid request");
        send(app, request).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("invalid request");
        send(app, request).await
    }

    /// Create a user through the API and return its id.
    pub async fn create_user(app: &Router, username: &str) -> String {
        let (status, body) = post_form(app, "/api/users", &format!("username={}", username)).await;
        assert_eq!(status, StatusCode::OK);
        body["_id"].as_str().expect("user id").to_string()
    }
}
