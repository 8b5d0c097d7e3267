use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::AppendHeaders;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use super::INVALID_CREDENTIALS;
use crate::config::AuthMode;
use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::SESSION_COOKIE;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<Response, ApiError> {
    // Malformed input is reported exactly like a wrong password.
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    let password = Password::new(body.password)
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let session = state
        .user_service
        .authenticate(&email, password)
        .await
        .map_err(ApiError::from)?;

    let success = ApiSuccess::new(StatusCode::OK, LoginResponseData::from(&session));

    Ok(match state.auth_mode {
        AuthMode::Bearer => success.into_response(),
        AuthMode::Cookie => {
            let cookie = session_cookie(
                &session.tokens.access_token,
                session.tokens.access_expires_at - Utc::now().timestamp(),
            );
            (AppendHeaders([(SET_COOKIE, cookie)]), success).into_response()
        }
    })
}

pub(crate) fn session_cookie(value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        SESSION_COOKIE,
        value,
        max_age_secs.max(0)
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub user: UserData,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: i64,
    pub refresh_expires_at: i64,
}

impl From<&AuthenticatedSession> for LoginResponseData {
    fn from(session: &AuthenticatedSession) -> Self {
        Self {
            user: (&session.user).into(),
            access_token: session.tokens.access_token.clone(),
            refresh_token: session.tokens.refresh_token.clone(),
            access_expires_at: session.tokens.access_expires_at,
            refresh_expires_at: session.tokens.refresh_expires_at,
        }
    }
}
