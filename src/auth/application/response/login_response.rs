use serde::Deserialize;

/// `UserSession` returned by `SessionManager.Login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub key: String,
    pub user_name: String,
    #[serde(default)]
    pub full_name: String,
}
