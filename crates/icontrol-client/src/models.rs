//! iControl REST models
//!
//! Only the shapes the session itself needs (login) plus the LTM virtual
//! server collection. Everything else is exchanged as `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /mgmt/shared/authn/login`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub login_provider_name: String,
}

/// Response of the login endpoint. The bearer token lives at `token.token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: AuthToken,
}

/// Token object returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    /// Lifetime in seconds (BIG-IP defaults to 1200)
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub expiration_micros: Option<u64>,
}

/// `GET /mgmt/tm/ltm/virtual/` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServerCollection {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub self_link: Option<String>,
    /// Absent when the device has no virtual servers
    #[serde(default)]
    pub items: Vec<VirtualServer>,
}

/// LTM virtual server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServer {
    pub name: String,
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub full_path: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub pool: Option<String>,
    #[serde(default)]
    pub ip_protocol: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub disabled: Option<bool>,
    /// Fields not modelled above, kept so a PUT of this object loses nothing
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VirtualServer {
    /// `fullPath` when present, otherwise the bare name
    pub fn display_name(&self) -> &str {
        self.full_path.as_deref().unwrap_or(&self.name)
    }
}
