//! SQLite User Repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{RepositoryError, UserRepositoryPort};
use crate::domain::user::{Email, PasskeyCredential, Role, User, UserId, Username};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, email_verified, \
     totp_enabled, totp_secret, passkey_enabled, passkey_credentials, passkey_verified, \
     verified, pending_token, pending_token_expires_at, daily_usage, usage_date, created_at";

/// SQLite User Repository
pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {} FROM users WHERE {} LIMIT 1", USER_COLUMNS, filter);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    email_verified: bool,
    totp_enabled: bool,
    totp_secret: Option<String>,
    passkey_enabled: bool,
    passkey_credentials: String,
    passkey_verified: bool,
    verified: bool,
    pending_token: Option<String>,
    pending_token_expires_at: Option<String>,
    daily_usage: i64,
    usage_date: Option<String>,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| RepositoryError::SerializationError(format!("unknown role: {}", row.role)))?;
        let passkey_credentials: Vec<PasskeyCredential> =
            serde_json::from_str(&row.passkey_credentials)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let usage_date = row
            .usage_date
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(User {
            id: UserId::from_string(row.id),
            username: Username::new(row.username)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            email: Email::from_trusted(row.email),
            password_hash: row.password_hash,
            role,
            email_verified: row.email_verified,
            totp_enabled: row.totp_enabled,
            totp_secret: row.totp_secret,
            passkey_enabled: row.passkey_enabled,
            passkey_credentials,
            passkey_verified: row.passkey_verified,
            verified: row.verified,
            pending_token: row.pending_token,
            pending_token_expires_at: row
                .pending_token_expires_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            daily_usage: row.daily_usage.max(0) as u32,
            usage_date,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let credentials = serde_json::to_string(&user.passkey_credentials)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, email_verified,
                totp_enabled, totp_secret, passkey_enabled, passkey_credentials, passkey_verified,
                verified, pending_token, pending_token_expires_at, daily_usage, usage_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.as_str())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.email_verified)
        .bind(user.totp_enabled)
        .bind(&user.totp_secret)
        .bind(user.passkey_enabled)
        .bind(credentials)
        .bind(user.passkey_verified)
        .bind(user.verified)
        .bind(&user.pending_token)
        .bind(user.pending_token_expires_at.as_ref().map(timestamp))
        .bind(user.daily_usage as i64)
        .bind(user.usage_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(timestamp(&user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(format!("user {} / {}", user.username, user.email))
            }
            _ => db_error(e),
        })?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let credentials = serde_json::to_string(&user.passkey_credentials)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = ?, email = ?, password_hash = ?, role = ?, email_verified = ?,
                totp_enabled = ?, totp_secret = ?, passkey_enabled = ?, passkey_credentials = ?,
                passkey_verified = ?, verified = ?, pending_token = ?, pending_token_expires_at = ?,
                daily_usage = ?, usage_date = ?
            WHERE id = ?
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.email_verified)
        .bind(user.totp_enabled)
        .bind(&user.totp_secret)
        .bind(user.passkey_enabled)
        .bind(credentials)
        .bind(user.passkey_verified)
        .bind(user.verified)
        .bind(&user.pending_token)
        .bind(user.pending_token_expires_at.as_ref().map(timestamp))
        .bind(user.daily_usage as i64)
        .bind(user.usage_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(user.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("id = ?", id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("username = ?", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("email = ?", email).await
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = ?1 OR email = ?1 ORDER BY username = ?1 DESC LIMIT 1",
            USER_COLUMNS
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_pending_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("pending_token = ?", token).await
    }

    async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error)?;

        Ok(count > 0)
    }

    async fn find_admins(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE role = 'admin' ORDER BY created_at",
            USER_COLUMNS
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(User::try_from).collect()
    }
}
