//! F5 BIG-IP iControl REST Client
//!
//! A thin session wrapper around the iControl REST API: log in with a
//! username and password, then read and modify configuration objects under
//! `/mgmt/tm` with GET/POST/PATCH/PUT/DELETE.
//!
//! # Example
//!
//! ```no_run
//! use icontrol_client::{ClientConfig, IControlSession, TlsMode};
//! use serde_json::{json, Value};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Lab devices usually carry a self-signed certificate
//! let config = ClientConfig::new("10.1.1.245", 443).with_tls(TlsMode::Insecure);
//! let mut session = IControlSession::new(config)?;
//!
//! session.login("admin", "admin").await?;
//!
//! // List virtual servers
//! let virtuals = session.list_virtual_servers().await?;
//!
//! // Disable one
//! let url = format!("{}/ltm/virtual/~Common~vs_web", session.tm_url());
//! let updated: Value = session.patch(&url, &json!({"disabled": true})).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every response other than 200 OK is returned as an [`IControlError`];
//! nothing is retried.

pub mod config;
pub mod error;
pub mod models;
pub mod session;
#[path = "trait.rs"]
pub mod icontrol_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use config::{ClientConfig, Scheme, TlsMode};
pub use error::IControlError;
pub use icontrol_trait::IControlApi;
pub use models::*;
pub use session::{AUTH_TOKEN_HEADER, IControlSession, LOGIN_PATH, TM_PATH, VIRTUAL_SERVERS_PATH};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockIControlClient, RecordedRequest};
