//! IControlApi trait for mocking
//!
//! Abstracts the session so callers can be unit tested against
//! [`crate::MockIControlClient`] instead of a live BIG-IP.

use crate::error::IControlError;
use crate::session::IControlSession;
use serde_json::Value;

/// iControl REST operations over raw JSON
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait IControlApi: Send + Sync {
    /// Device root URL
    fn base_url(&self) -> &str;

    /// Bearer token from the last successful login
    fn token(&self) -> Option<&str>;

    async fn login(&mut self, username: &str, password: &str) -> Result<(), IControlError>;
    async fn get(&self, url: &str) -> Result<Value, IControlError>;
    async fn post(&self, url: &str, body: &Value) -> Result<Value, IControlError>;
    async fn patch(&self, url: &str, body: &Value) -> Result<Value, IControlError>;
    async fn put(&self, url: &str, body: &Value) -> Result<Value, IControlError>;
    async fn delete(&self, url: &str) -> Result<(), IControlError>;
    async fn list_virtual_servers(&self) -> Result<Value, IControlError>;
}

#[async_trait::async_trait]
impl IControlApi for IControlSession {
    fn base_url(&self) -> &str {
        IControlSession::base_url(self)
    }

    fn token(&self) -> Option<&str> {
        IControlSession::token(self)
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<(), IControlError> {
        IControlSession::login(self, username, password).await
    }

    async fn get(&self, url: &str) -> Result<Value, IControlError> {
        IControlSession::get(self, url).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, IControlError> {
        IControlSession::post(self, url, body).await
    }

    async fn patch(&self, url: &str, body: &Value) -> Result<Value, IControlError> {
        IControlSession::patch(self, url, body).await
    }

    async fn put(&self, url: &str, body: &Value) -> Result<Value, IControlError> {
        IControlSession::put(self, url, body).await
    }

    async fn delete(&self, url: &str) -> Result<(), IControlError> {
        IControlSession::delete(self, url).await
    }

    async fn list_virtual_servers(&self) -> Result<Value, IControlError> {
        IControlSession::list_virtual_servers(self).await
    }
}
