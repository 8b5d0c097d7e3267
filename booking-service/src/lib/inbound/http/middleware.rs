use std::collections::HashSet;
use std::sync::Arc;

use auth::AccessDetails;
use auth::JwtError;
use auth::TokenValidator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::config::AuthMode;
use crate::domain::user::models::AccountType;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Cookie carrying the access token in cookie mode.
pub const SESSION_COOKIE: &str = "session";

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub account_type: String,
    pub access_uuid: Uuid,
}

impl AuthenticatedUser {
    pub fn access_details(&self) -> AccessDetails {
        AccessDetails {
            user_id: self.user_id.0,
            access_uuid: self.access_uuid,
            account_type: self.account_type.clone(),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(
            self.account_type.parse::<AccountType>(),
            Ok(AccountType::Admin) | Ok(AccountType::System)
        )
    }
}

impl From<AccessDetails> for AuthenticatedUser {
    fn from(details: AccessDetails) -> Self {
        Self {
            user_id: UserId(details.user_id),
            account_type: details.account_type,
            access_uuid: details.access_uuid,
        }
    }
}

fn rejection(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthorized() -> Response {
    rejection(StatusCode::UNAUTHORIZED, "Invalid or missing token")
}

/// Middleware that validates the access token and adds the caller to request
/// extensions.
///
/// Every token failure yields the same 401 body; the cause is only logged.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let validated = match state.auth_mode {
        AuthMode::Bearer => TokenValidator::extract_bearer(req.headers()),
        AuthMode::Cookie => session_token(req.headers()),
    }
    .and_then(|token| state.authenticator.validate_token(token));

    let details = validated.map_err(|e| {
        match e {
            JwtError::MissingToken => tracing::warn!("Request without token"),
            JwtError::ExpiredToken => tracing::warn!("Expired token presented"),
            JwtError::BadSignature => tracing::warn!("Token with invalid signature presented"),
            JwtError::MalformedToken(ref reason) => {
                tracing::warn!(reason = %reason, "Malformed token presented")
            }
            JwtError::EncodingFailed(ref reason) => {
                tracing::error!(reason = %reason, "Unexpected token error")
            }
        }
        unauthorized()
    })?;

    state
        .user_service
        .verify_session(&details)
        .await
        .map_err(|e| match e {
            UserError::SessionRevoked => {
                tracing::info!(
                    user_id = details.user_id,
                    access_uuid = %details.access_uuid,
                    "Revoked token presented"
                );
                unauthorized()
            }
            other => {
                tracing::error!(error = %other, "Session lookup failed");
                rejection(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        })?;

    req.extensions_mut().insert(AuthenticatedUser::from(details));

    Ok(next.run(req).await)
}

/// Read the access token from the `session` cookie.
///
/// # Errors
/// * `MissingToken` - No cookie header or no non-empty `session` cookie
pub fn session_token(headers: &HeaderMap) -> Result<&str, JwtError> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or(JwtError::MissingToken)
}

/// Set of account types allowed through `require_roles`.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    permitted: Arc<HashSet<String>>,
}

impl RoleGuard {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            permitted: Arc::new(roles.into_iter().map(Into::into).collect()),
        }
    }

    pub fn permits(&self, role: &str) -> bool {
        self.permitted.contains(role)
    }
}

/// Middleware that admits only callers whose role is in the guard's set.
///
/// Must run after `authenticate`. A request that reaches it unauthenticated
/// gets 401, an authenticated caller with the wrong role gets 403.
pub async fn require_roles(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(user) = req.extensions().get::<AuthenticatedUser>() else {
        tracing::error!("Role check reached without an authenticated caller");
        return Err(unauthorized());
    };

    if !guard.permits(&user.account_type) {
        tracing::warn!(
            user_id = %user.user_id,
            account_type = %user.account_type,
            "Role not permitted"
        );
        return Err(rejection(StatusCode::FORBIDDEN, "Insufficient permissions"));
    }

    Ok(next.run(req).await)
}
