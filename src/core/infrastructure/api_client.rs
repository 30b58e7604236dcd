//! Internal HTTP client that carries the session token and speaks VI/JSON.

use crate::core::domain::{
    error::{ValidationError, VsphereError, VsphereResult},
    model::{ClientConfig, VsphereConnection},
    value_object::{SESSION_HEADER, VsphereSessionId},
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Internal HTTP client that manages the session and provides methods to call
/// the VI/JSON API.
///
/// Every request carries the `vmware-api-session-id` header obtained at login.
/// A request without a session fails locally with
/// `VsphereError::Authentication`; nothing is retried.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<VsphereConnection>,
    session: Arc<RwLock<Option<VsphereSessionId>>>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts unauthenticated.
    ///
    /// # Errors
    /// Returns `VsphereError::Connection` if the HTTP client cannot be built,
    /// and `VsphereError::Validation` for a zero rate limit.
    pub fn new(connection: VsphereConnection, config: &ClientConfig) -> VsphereResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .build()
            .map_err(|e| VsphereError::Connection(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let rate = non_zero(rl.requests_per_second, "requests_per_second")?;
                let burst = non_zero(rl.burst_size, "burst_size")?;
                let quota = Quota::per_second(rate).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            session: Arc::new(RwLock::new(None)),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &VsphereConnection {
        &self.connection
    }

    /// Sets the session (used after a successful login).
    pub async fn set_session(&self, session: VsphereSessionId) {
        let mut lock = self.session.write().await;
        *lock = Some(session);
    }

    pub async fn clear_session(&self) {
        self.session.write().await.take();
    }

    /// Returns the current session, if any.
    pub async fn session(&self) -> Option<VsphereSessionId> {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Reads a property: `GET {Type}/{id}/{property}`.
    pub async fn get<T>(&self, path: &str) -> VsphereResult<T>
    where
        T: DeserializeOwned,
    {
        self.execute_request(reqwest::Method::GET, path, None::<&()>)
            .await
    }

    /// Invokes a method: `POST {Type}/{id}/{Method}` with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> VsphereResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.execute_request(reqwest::Method::POST, path, Some(body))
            .await
    }

    async fn execute_request<B, T>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> VsphereResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let session = self.session.read().await.clone().ok_or_else(|| {
            VsphereError::Authentication("Not logged in, call login() first".to_string())
        })?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.url().join(path);
        debug!(%method, %url, "vSphere API request");

        let mut req_builder = self
            .http_client
            .request(method, &url)
            .header(ACCEPT, "application/json")
            .header(SESSION_HEADER, session.as_str());

        if let Some(body) = body {
            req_builder = req_builder.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| VsphereError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| VsphereError::Connection(format!("Failed to read response: {}", e)))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(VsphereError::Authentication(
                "Session is not authenticated or has expired".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }

        decode_body(&bytes)
    }
}

fn non_zero(value: u32, field: &str) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(value).ok_or_else(|| ValidationError::Field {
        field: field.to_string(),
        message: "Must be greater than zero".to_string(),
    })
}

/// Void methods answer with an empty body, which decodes as `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> VsphereResult<T> {
    let value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(bytes)
            .map_err(|e| VsphereError::Connection(format!("Failed to parse response: {}", e)))?
    };
    serde_json::from_value(value)
        .map_err(|e| VsphereError::Connection(format!("Failed to parse response: {}", e)))
}

/// Faults come back as JSON objects; prefer their human readable message.
pub(crate) fn api_error(status: StatusCode, bytes: &[u8]) -> VsphereError {
    let text = String::from_utf8_lossy(bytes).to_string();
    let message = serde_json::from_slice::<Value>(bytes)
        .ok()
        .and_then(|fault| {
            ["localizedMessage", "message", "_typeName"]
                .iter()
                .find_map(|field| fault.get(*field).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or(text);
    VsphereError::Api {
        status: status.as_u16(),
        message,
    }
}
