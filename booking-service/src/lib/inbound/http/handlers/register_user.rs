use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::AccountType;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::AccountTypeError;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::PersonNameError;

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    #[serde(default = "RegisterUserRequest::default_account_type")]
    account_type: String,
    #[serde(default)]
    business_id: Option<u64>,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterUserRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),

    #[error("Invalid name: {0}")]
    Name(#[from] PersonNameError),

    #[error("Invalid account type: {0}")]
    AccountType(#[from] AccountTypeError),

    #[error("{0} accounts cannot be self-registered")]
    PrivilegedAccount(AccountType),
}

impl RegisterUserRequest {
    fn default_account_type() -> String {
        AccountType::Individual.as_str().to_string()
    }

    fn try_into_command(self) -> Result<RegisterUserCommand, ParseRegisterUserRequestError> {
        let account_type = self.account_type.parse::<AccountType>()?;
        if matches!(account_type, AccountType::Admin | AccountType::System) {
            return Err(ParseRegisterUserRequestError::PrivilegedAccount(account_type));
        }

        Ok(RegisterUserCommand {
            email: EmailAddress::new(self.email)?,
            password: Password::new(self.password)?,
            account_type,
            first_name: PersonName::new(self.first_name)?,
            last_name: PersonName::new(self.last_name)?,
            business_id: self.business_id,
        })
    }
}

impl From<ParseRegisterUserRequestError> for ApiError {
    fn from(err: ParseRegisterUserRequestError) -> Self {
        match err {
            ParseRegisterUserRequestError::PrivilegedAccount(_) => {
                ApiError::Forbidden(err.to_string())
            }
            _ => ApiError::UnprocessableEntity(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(account_type: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            email: "Ada@Example.com".to_string(),
            password: "analytical".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            account_type: account_type.to_string(),
            business_id: None,
        }
    }

    #[test]
    fn test_valid_request_becomes_command() {
        let command = request("business").try_into_command().unwrap();

        assert_eq!(command.email.as_str(), "ada@example.com");
        assert_eq!(command.account_type, AccountType::Business);
        assert_eq!(command.first_name.as_str(), "Ada");
    }

    #[test]
    fn test_privileged_accounts_cannot_self_register() {
        for account_type in ["admin", "system", "System"] {
            let error = request(account_type).try_into_command().unwrap_err();
            assert!(matches!(ApiError::from(error), ApiError::Forbidden(_)));
        }
    }

    #[test]
    fn test_unknown_account_type() {
        let error = request("owner").try_into_command().unwrap_err();
        assert!(matches!(ApiError::from(error), ApiError::UnprocessableEntity(_)));
    }
}
