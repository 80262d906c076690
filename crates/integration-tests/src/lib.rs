//! Integration test harness for Artisan Collective.
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot`
//! against in-memory stores and an in-memory session store, so the
//! suites run without a database or a listening socket.
//!
//! Session continuity works the same way a browser's does: helpers pull
//! the session cookie out of the login response and callers pass it
//! back on subsequent requests.

#![allow(clippy::missing_panics_doc)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use artisan_collective_server::app;
use artisan_collective_server::config::ServerConfig;
use artisan_collective_server::middleware::create_memory_session_layer;
use artisan_collective_server::state::{AppState, Stores};

/// Multipart boundary used by the form builders.
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// A file part for [`multipart_body`]: (field name, filename, content
/// type, data).
pub type FilePart<'a> = (&'a str, &'a str, &'a str, &'a [u8]);

/// An application instance wired to fresh in-memory stores.
pub struct TestApp {
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build a fresh application with empty in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/unused"),
            host: "127.0.0.1".parse().expect("valid address"),
            port: 0,
            base_url: "http://localhost".to_owned(),
            sentry_dsn: None,
        };
        let state = AppState::new(config, Stores::in_memory(), None);
        let router = app(state).layer(create_memory_session_layer());
        Self { router }
    }

    /// Send a request through the router.
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router")
    }

    /// GET a path, optionally with a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        self.request(build(Method::GET, path, cookie, None, Body::empty()))
            .await
    }

    /// DELETE a path with a session cookie.
    pub async fn delete(&self, path: &str, cookie: &str) -> Response<Body> {
        self.request(build(Method::DELETE, path, Some(cookie), None, Body::empty()))
            .await
    }

    /// POST a JSON body, optionally with a session cookie.
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let bytes = serde_json::to_vec(body).expect("serializable body");
        self.request(build(
            Method::POST,
            path,
            cookie,
            Some("application/json"),
            Body::from(bytes),
        ))
        .await
    }

    /// POST a multipart form, optionally with a session cookie.
    pub async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let (content_type, body) = multipart_body(fields, files);
        self.request(build(
            Method::POST,
            path,
            cookie,
            Some(&content_type),
            Body::from(body),
        ))
        .await
    }

    /// PUT a multipart form with a session cookie.
    pub async fn put_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
        cookie: &str,
    ) -> Response<Body> {
        let (content_type, body) = multipart_body(fields, files);
        self.request(build(
            Method::PUT,
            path,
            Some(cookie),
            Some(&content_type),
            Body::from(body),
        ))
        .await
    }

    /// Register an account with the minimal required fields.
    pub async fn signup(&self, username: &str, password: &str, name: &str) -> Response<Body> {
        self.post_multipart(
            "/api/signup",
            &[("username", username), ("password", password), ("name", name)],
            &[],
            None,
        )
        .await
    }

    /// Log in and return the session cookie.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api/login",
                &serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login should succeed");
        session_cookie(&response).expect("login sets a session cookie")
    }

    /// Register and log in, returning the session cookie.
    pub async fn signup_and_login(&self, username: &str, password: &str, name: &str) -> String {
        let response = self.signup(username, password, name).await;
        assert_eq!(response.status(), StatusCode::CREATED, "signup should succeed");
        self.login(username, password).await
    }
}

fn build(
    method: Method,
    path: &str,
    cookie: Option<&str>,
    content_type: Option<&str>,
    body: Body,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).expect("valid request")
}

/// Build a multipart/form-data body. Returns (content type, body).
#[must_use]
pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Extract the session cookie pair from a response's Set-Cookie header.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    raw.split(';').next().map(str::to_owned)
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes()
        .to_vec()
}

/// Collect a response body as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}
