use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::AppendHeaders;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Extension;
use serde::Serialize;

use super::login::session_cookie;
use super::ApiError;
use super::ApiSuccess;
use crate::config::AuthMode;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Response, ApiError> {
    state
        .user_service
        .logout(&user.access_details())
        .await
        .map_err(ApiError::from)?;

    let success = ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "Logged out".to_string(),
        },
    );

    Ok(match state.auth_mode {
        AuthMode::Bearer => success.into_response(),
        AuthMode::Cookie => {
            (AppendHeaders([(SET_COOKIE, session_cookie("", 0))]), success).into_response()
        }
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
