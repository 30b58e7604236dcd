use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::{
        domain::{
            error::{ValidationError, VsphereError, VsphereResult},
            model::VsphereConnection,
            value_object::{SESSION_HEADER, VsphereSessionId, validate_session_id},
        },
        infrastructure::api_client::api_error,
    },
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tracing::info;

const LOGIN_PATH: &str = "SessionManager/SessionManager/Login";

/// Fault type returned for wrong credentials.
const INVALID_LOGIN: &str = "InvalidLogin";

pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    /// Opens a session and returns its token.
    pub async fn execute(&self, connection: &VsphereConnection) -> VsphereResult<VsphereSessionId> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .build()
            .map_err(|e| VsphereError::Connection(e.to_string()))?;
        let url = connection.url().join(LOGIN_PATH);
        let request = self.build_login_request(connection);
        let response = self.send_request(&http_client, &url, &request).await?;

        match response.status() {
            StatusCode::OK => self.handle_successful_login(response).await,
            StatusCode::UNAUTHORIZED => Err(VsphereError::Authentication(
                "Invalid credentials provided".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(VsphereError::Connection(
                "Login endpoint not found".to_string(),
            )),
            StatusCode::SERVICE_UNAVAILABLE => Err(VsphereError::Connection(
                "vSphere service is currently unavailable".to_string(),
            )),
            status => {
                let body = response.bytes().await.unwrap_or_default();
                match api_error(status, &body) {
                    VsphereError::Api { message, .. } if message == INVALID_LOGIN => Err(
                        VsphereError::Authentication("Invalid credentials provided".to_string()),
                    ),
                    other => Err(other),
                }
            }
        }
    }

    fn build_login_request(&self, connection: &VsphereConnection) -> LoginRequest {
        LoginRequest {
            user_name: connection.username().as_str().to_string(),
            password: connection.password().as_str().to_string(),
        }
    }

    async fn send_request(
        &self,
        client: &Client,
        url: &str,
        request: &LoginRequest,
    ) -> VsphereResult<reqwest::Response> {
        client
            .post(url)
            .headers(self.default_headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| VsphereError::Connection(e.to_string()))
    }

    async fn handle_successful_login(
        &self,
        response: reqwest::Response,
    ) -> VsphereResult<VsphereSessionId> {
        let token = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                VsphereError::Authentication(format!(
                    "Login response did not carry a {SESSION_HEADER} header"
                ))
            })?;
        validate_session_id(&token).map_err(|source| match source {
            ValidationError::Field { message, .. } => VsphereError::Authentication(message),
            other => VsphereError::from(other),
        })?;

        let session = response.json::<LoginResponse>().await.map_err(|e| {
            VsphereError::Connection(format!("Failed to parse login response: {}", e))
        })?;
        info!(user = %session.user_name, "vSphere session established");

        Ok(VsphereSessionId::new_unchecked(token))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}
