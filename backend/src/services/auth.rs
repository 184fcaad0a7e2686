//! Authentication service: credential verification and token issuance

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Claims;

#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub role: String,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    full_name: Option<String>,
    password_hash: String,
    role: String,
    active: bool,
}

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtConfig) -> Self {
        Self { db, jwt }
    }

    /// Verify credentials, record the login, and issue a JWT.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, full_name, password_hash, role, active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(&input.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.active {
            return Err(AppError::InvalidCredentials);
        }

        let valid = bcrypt::verify(&input.password, &user.password_hash)
            .map_err(|_| AppError::InvalidCredentials)?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let token = self.issue_token(&user)?;

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok(LoginResponse {
            token,
            user: UserProfile {
                id: user.id,
                username: user.username,
                full_name: user.full_name,
                role: user.role,
            },
        })
    }

    fn issue_token(&self, user: &UserRow) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now,
            exp: now + self.jwt.access_token_expiry,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))
    }
}
