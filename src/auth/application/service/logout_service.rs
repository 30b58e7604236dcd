use crate::core::{
    domain::error::VsphereResult, infrastructure::api_client::ApiClient,
};
use serde_json::{Value, json};
use tracing::info;

const LOGOUT_PATH: &str = "SessionManager/SessionManager/Logout";

/// Ends the session held by an [`ApiClient`].
pub struct LogoutService;

impl LogoutService {
    /// Logs out on the server, then forgets the token. The token is dropped
    /// locally even when the server call fails.
    pub async fn execute(&self, api_client: &ApiClient) -> VsphereResult<()> {
        if !api_client.is_authenticated().await {
            return Ok(());
        }
        let result = api_client.post::<_, Value>(LOGOUT_PATH, &json!({})).await;
        api_client.clear_session().await;
        result?;
        info!("vSphere session closed");
        Ok(())
    }
}
