use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::models::AccountType;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str =
    "id, email, password_hash, account_type, first_name, last_name, business_id, created_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

// BIGSERIAL ids are never negative.
fn to_db_id(id: &UserId) -> Result<i64, UserError> {
    i64::try_from(id.0).map_err(|_| UserError::NotFound(id.to_string()))
}

fn from_db_id(id: i64) -> Result<u64, UserError> {
    u64::try_from(id).map_err(|_| UserError::DatabaseError(format!("Negative id in storage: {}", id)))
}

fn user_from_row(row: PgRow) -> Result<User, UserError> {
    let id: i64 = row.try_get("id").map_err(database_error)?;
    let account_type: String = row.try_get("account_type").map_err(database_error)?;
    let business_id: Option<i64> = row.try_get("business_id").map_err(database_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(database_error)?;

    Ok(User {
        id: UserId(from_db_id(id)?),
        email: EmailAddress::new(row.try_get("email").map_err(database_error)?)?,
        password_hash: row.try_get("password_hash").map_err(database_error)?,
        account_type: account_type.parse::<AccountType>()?,
        first_name: PersonName::new(row.try_get("first_name").map_err(database_error)?)?,
        last_name: PersonName::new(row.try_get("last_name").map_err(database_error)?)?,
        business_id: business_id.map(from_db_id).transpose()?,
        created_at,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let business_id = user
            .business_id
            .map(|id| to_db_id(&UserId(id)))
            .transpose()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, account_type, first_name, last_name, business_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.account_type.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(business_id)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                    return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                }
            }
            database_error(e)
        })?;

        user_from_row(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let Ok(db_id) = to_db_id(id) else {
            return Ok(None);
        };

        sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(db_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(user_from_row)
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .map(user_from_row)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?
        .into_iter()
        .map(user_from_row)
        .collect()
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(to_db_id(id)?)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
