//! Mock iControl client for unit testing
//!
//! Serves canned responses keyed by (method, URL) and records every request,
//! so callers written against [`IControlApi`] can be tested without a device.
//! Unconfigured routes answer 404, like a BIG-IP asked for a missing resource.

use crate::error::IControlError;
use crate::icontrol_trait::IControlApi;
use crate::models::LoginResponse;
use crate::session::{LOGIN_PATH, VIRTUAL_SERVERS_PATH};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    /// Token the caller held when the request was made
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: Value,
}

/// Mock iControl client for testing
#[derive(Debug, Clone)]
pub struct MockIControlClient {
    base_url: String,
    token: Option<String>,
    responses: Arc<Mutex<HashMap<(Method, String), CannedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockIControlClient {
    /// Create a new mock client rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer `method url` with `status` and `body` (for test setup)
    pub fn respond(&self, method: Method, url: &str, status: StatusCode, body: Value) {
        let key = (method, self.build_url(url));
        lock(&self.responses).insert(key, CannedResponse { status, body });
    }

    /// Make the login endpoint hand out `token`
    pub fn accept_login(&self, token: &str) {
        self.respond(
            Method::POST,
            LOGIN_PATH,
            StatusCode::OK,
            json!({"token": {"token": token}}),
        );
    }

    /// Make the login endpoint reject credentials with `status`
    pub fn reject_login(&self, status: StatusCode) {
        self.respond(
            Method::POST,
            LOGIN_PATH,
            status,
            json!({"code": status.as_u16(), "message": "Authentication failed."}),
        );
    }

    /// All requests seen so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn handle(&self, method: Method, url: &str, body: Option<Value>) -> (StatusCode, Value, String) {
        let url = self.build_url(url);
        lock(&self.requests).push(RecordedRequest {
            method: method.clone(),
            url: url.clone(),
            body,
            token: self.token.clone(),
        });

        let canned = lock(&self.responses).get(&(method, url.clone())).cloned();
        match canned {
            Some(response) => (response.status, response.body, url),
            None => (
                StatusCode::NOT_FOUND,
                json!({"code": 404, "message": format!("Object not found: {}", url)}),
                url,
            ),
        }
    }

    fn reply(&self, method: Method, url: &str, body: Option<Value>) -> Result<Value, IControlError> {
        let (status, response, url) = self.handle(method.clone(), url, body);
        if status != StatusCode::OK {
            return Err(IControlError::Status {
                method: method.to_string(),
                url,
                status,
                body: response.to_string(),
            });
        }
        Ok(response)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait::async_trait]
impl IControlApi for MockIControlClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn login(&mut self, username: &str, _password: &str) -> Result<(), IControlError> {
        let body = json!({"username": username, "password": "<redacted>"});
        let (status, response, _) = self.handle(Method::POST, LOGIN_PATH, Some(body));
        if status != StatusCode::OK {
            return Err(IControlError::Authentication {
                status,
                body: response.to_string(),
            });
        }

        let login: LoginResponse = serde_json::from_value(response).map_err(|e| {
            tracing::debug!("Mock login response has no usable token: {}", e);
            IControlError::MissingToken
        })?;
        self.token = Some(login.token.token);
        Ok(())
    }

    async fn get(&self, url: &str) -> Result<Value, IControlError> {
        self.reply(Method::GET, url, None)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, IControlError> {
        self.reply(Method::POST, url, Some(body.clone()))
    }

    async fn patch(&self, url: &str, body: &Value) -> Result<Value, IControlError> {
        self.reply(Method::PATCH, url, Some(body.clone()))
    }

    async fn put(&self, url: &str, body: &Value) -> Result<Value, IControlError> {
        self.reply(Method::PUT, url, Some(body.clone()))
    }

    async fn delete(&self, url: &str) -> Result<(), IControlError> {
        self.reply(Method::DELETE, url, None).map(|_| ())
    }

    async fn list_virtual_servers(&self) -> Result<Value, IControlError> {
        self.reply(Method::GET, VIRTUAL_SERVERS_PATH, None)
    }
}
