use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vendora_core::{SessionClaims, SessionToken};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionToken> for LoginResponse {
    fn from(token: SessionToken) -> Self {
        Self {
            expires_in: token.expires_in(),
            expires_at: token.expires_at(),
            token_type: "Bearer".to_string(),
            access_token: token.into_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub account_id: String,
    pub role: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<SessionClaims> for SessionInfo {
    fn from(claims: SessionClaims) -> Self {
        Self {
            account_id: claims.sub.as_str().to_string(),
            role: claims.role.as_str().to_string(),
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
