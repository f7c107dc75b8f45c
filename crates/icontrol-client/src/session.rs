//! iControl REST session
//!
//! Holds the target device, the outgoing header map and the bearer token.
//! The only place the header map changes is a successful [`IControlSession::login`].

use crate::config::{ClientConfig, TlsMode};
use crate::error::IControlError;
use crate::models::{LoginRequest, LoginResponse};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Header carrying the bearer token on authenticated calls
pub const AUTH_TOKEN_HEADER: &str = "x-f5-auth-token";

/// Authentication endpoint
pub const LOGIN_PATH: &str = "/mgmt/shared/authn/login";

/// Root of the traffic-management resource tree
pub const TM_PATH: &str = "/mgmt/tm";

/// LTM virtual server collection
pub const VIRTUAL_SERVERS_PATH: &str = "/mgmt/tm/ltm/virtual/";

/// Session against a single BIG-IP
#[derive(Debug)]
pub struct IControlSession {
    client: Client,
    config: ClientConfig,
    base_url: String,
    headers: HeaderMap,
    token: Option<String>,
}

impl IControlSession {
    /// Create an unauthenticated session
    ///
    /// # Arguments
    /// * `config` - Target device and transport settings
    pub fn new(config: ClientConfig) -> Result<Self, IControlError> {
        if config.host.trim().is_empty() {
            return Err(IControlError::InvalidConfig("host must not be empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.tls == TlsMode::Insecure {
            warn!(
                "TLS certificate verification disabled for {}:{}",
                config.host, config.port
            );
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client,
            base_url: config.base_url(),
            config,
            headers,
            token: None,
        })
    }

    /// Device root, e.g. `https://10.0.0.1:443`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Root of the `/mgmt/tm` resource tree
    pub fn tm_url(&self) -> String {
        format!("{}{}", self.base_url, TM_PATH)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Bearer token from the last successful login
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Resolve a resource path against the device root.
    /// Absolute URLs are used as given.
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Authenticate and store the returned token
    ///
    /// Posts the credentials (plus the configured login provider) to
    /// `/mgmt/shared/authn/login`. On 200 the token at `token.token` is
    /// stored and attached as `X-F5-Auth-Token` to every later call.
    ///
    /// # Returns
    /// * `Ok(())` - Session is now authenticated
    /// * `Err(IControlError::Authentication)` - Device answered non-200; session untouched
    /// * `Err(IControlError::MissingToken)` - 200 without a token; session untouched
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), IControlError> {
        let url = self.build_url(LOGIN_PATH);
        let payload = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            login_provider_name: self.config.login_provider.clone(),
        };
        let body = serde_json::to_vec(&payload)?;
        debug!("POST {} (login as {})", url, username);

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .basic_auth(username, Some(password))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(IControlError::Authentication { status, body });
        }

        let text = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let login: LoginResponse = serde_json::from_value(value).map_err(|e| {
            debug!("Login response has no usable token: {}", e);
            IControlError::MissingToken
        })?;

        let mut header = HeaderValue::from_str(&login.token.token)
            .map_err(|e| IControlError::InvalidConfig(format!("token is not a valid header value: {}", e)))?;
        header.set_sensitive(true);

        self.headers.insert(AUTH_TOKEN_HEADER, header);
        self.token = Some(login.token.token);
        info!("Authenticated to {} as {}", self.base_url, username);
        Ok(())
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, IControlError> {
        let text = self.execute(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Make a POST request with `body` serialized as JSON
    pub async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, IControlError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, url, body).await
    }

    /// Make a PATCH request with `body` serialized as JSON
    pub async fn patch<T, B>(&self, url: &str, body: &B) -> Result<T, IControlError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, url, body).await
    }

    /// Make a PUT request with `body` serialized as JSON
    pub async fn put<T, B>(&self, url: &str, body: &B) -> Result<T, IControlError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, url, body).await
    }

    /// Make a DELETE request. BIG-IP answers 200 with an empty body.
    pub async fn delete(&self, url: &str) -> Result<(), IControlError> {
        self.execute(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// List LTM virtual servers
    ///
    /// Returns the collection body unchanged. Also logs the current headers
    /// and an equivalent curl command at debug level.
    pub async fn list_virtual_servers(&self) -> Result<serde_json::Value, IControlError> {
        let url = self.build_url(VIRTUAL_SERVERS_PATH);
        let collection = self.get(&url).await?;
        debug!("Headers: {:?}", self.headers);
        debug!("{}", self.curl_command(Method::GET, &url));
        Ok(collection)
    }

    /// Render an equivalent curl invocation for `method url` with the
    /// session headers. The token is redacted.
    pub fn curl_command(&self, method: Method, url: &str) -> String {
        let mut command = String::from("curl -sv");
        if self.config.tls == TlsMode::Insecure {
            command.push('k');
        }
        command.push_str(&format!(" -X {} '{}'", method, url));

        for (name, value) in &self.headers {
            let rendered = if value.is_sensitive() {
                "<redacted>"
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            command.push_str(&format!(" -H '{}: {}'", name, rendered));
        }
        command
    }

    async fn send_json<T, B>(&self, method: Method, url: &str, body: &B) -> Result<T, IControlError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)?;
        let text = self.execute(method, url, Some(payload)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send one request and return the body of a 200 response
    async fn execute(&self, method: Method, url: &str, body: Option<Vec<u8>>) -> Result<String, IControlError> {
        let url = self.build_url(url);
        match &body {
            Some(payload) => debug!("{} {} with body: {}", method, url, String::from_utf8_lossy(payload)),
            None => debug!("{} {}", method, url),
        }

        let mut request = self.client.request(method.clone(), &url).headers(self.headers.clone());
        if let Some(payload) = body {
            request = request.body(payload);
        }
        let response = request.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(IControlError::Status {
                method: method.to_string(),
                url,
                status,
                body,
            });
        }

        Ok(response.text().await?)
    }
}
