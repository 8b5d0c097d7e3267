use std::fmt;
use std::str::FromStr;

use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::AccountTypeError;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::PersonNameError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Represents a registered account and its credential
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub account_type: AccountType,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub business_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// User record before storage has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: String,
    pub account_type: AccountType,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub business_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Attach the storage-assigned id.
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            account_type: self.account_type,
            first_name: self.first_name,
            last_name: self.last_name,
            business_id: self.business_id,
            created_at: self.created_at,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl UserId {
    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not an unsigned integer
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        s.parse::<u64>()
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(format!("{}: {}", s, e)))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// Addresses are lowercased so lookups are case-insensitive.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of account, carried in access tokens as the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Individual,
    Business,
    System,
    Admin,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Individual => "individual",
            AccountType::Business => "business",
            AccountType::System => "system",
            AccountType::Admin => "admin",
        }
    }
}

impl FromStr for AccountType {
    type Err = AccountTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "individual" => Ok(AccountType::Individual),
            "business" => Ok(AccountType::Business),
            "system" => Ok(AccountType::System),
            "admin" => Ok(AccountType::Admin),
            _ => Err(AccountTypeError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First or last name of a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 64;

    /// # Errors
    /// * `Empty` - Blank after trimming
    /// * `TooLong` - More than 64 characters
    pub fn new(name: String) -> Result<Self, PersonNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(PersonNameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password as submitted by the client.
///
/// Only lives long enough to be hashed or verified and never shows up in
/// `Debug` output.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MAX_LENGTH: usize = 1024;

    /// # Errors
    /// * `Empty` - Zero-length password
    /// * `TooLong` - More than 1024 bytes
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.is_empty() {
            Err(PasswordPolicyError::Empty)
        } else if password.len() > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: password.len(),
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub account_type: AccountType,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub business_id: Option<u64>,
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: User,
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parsing() {
        assert_eq!(UserId::from_string("42"), Ok(UserId(42)));
        assert!(UserId::from_string("-1").is_err());
        assert!(UserId::from_string("abc").is_err());
    }

    #[test]
    fn test_email_is_normalized() {
        let email = EmailAddress::new(" Alice@Example.COM ".to_string()).unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_rejects_garbage() {
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_account_type_round_trip_names() {
        for account_type in [
            AccountType::Individual,
            AccountType::Business,
            AccountType::System,
            AccountType::Admin,
        ] {
            assert_eq!(account_type.as_str().parse::<AccountType>(), Ok(account_type));
        }
        assert_eq!("Individual".parse::<AccountType>(), Ok(AccountType::Individual));
        assert!("owner".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_person_name_bounds() {
        assert_eq!(PersonName::new("   ".to_string()), Err(PersonNameError::Empty));
        assert!(matches!(
            PersonName::new("x".repeat(65)),
            Err(PersonNameError::TooLong { max: 64, actual: 65 })
        ));
        assert_eq!(PersonName::new(" Ada ".to_string()).unwrap().as_str(), "Ada");
    }

    #[test]
    fn test_password_policy_and_redaction() {
        assert_eq!(Password::new(String::new()).err(), Some(PasswordPolicyError::Empty));
        assert!(Password::new("x".repeat(1025)).is_err());

        let password = Password::new("correct-horse".to_string()).unwrap();
        assert_eq!(password.expose(), "correct-horse");
        assert!(!format!("{:?}", password).contains("correct-horse"));
    }
}
