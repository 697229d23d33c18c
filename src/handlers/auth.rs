//! Login (with first-run bootstrap) and password rotation.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::password::{ALGORITHM, HASH_VERSION};
use crate::auth::{generate_salt, hash_password, verify_password, AuthUser, DEFAULT_ITERATIONS};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    hashed_password: String,
    salt: String,
    iterations: i32,
}

/// First-run bootstrap is a one-time implicit elevation: only an empty users
/// table permits it.
fn bootstrap_allowed(user_count: i64) -> bool {
    user_count == 0
}

/// Resolve a fetched user row and password to a user id. Absent user and
/// digest mismatch are indistinguishable to the caller.
fn authenticate(user: Option<UserRow>, password: &str) -> Result<String, AppError> {
    let user = user.ok_or(AppError::InvalidCredentials)?;
    if !verify_password(
        password,
        &user.salt,
        user.iterations as u32,
        &user.hashed_password,
    ) {
        return Err(AppError::InvalidCredentials);
    }
    Ok(user.id)
}

/// POST /auth/login. On an empty users table this is first-run bootstrap:
/// the given credentials become the first (fully privileged) user. Not
/// available again once any user exists.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let (username, password) = match (body.username, body.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(AppError::BadRequest(
                "username and password are required".into(),
            ))
        }
    };

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;

    let user_id = if bootstrap_allowed(count) {
        let id = uuid::Uuid::new_v4().to_string();
        let salt = generate_salt();
        let digest = hash_password(&password, &salt, DEFAULT_ITERATIONS);
        sqlx::query(
            "INSERT INTO users (id, username, hashed_password, salt, hash_version, iterations, algorithm) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&id)
        .bind(&username)
        .bind(&digest)
        .bind(&salt)
        .bind(HASH_VERSION)
        .bind(DEFAULT_ITERATIONS as i32)
        .bind(ALGORITHM)
        .execute(&state.pool)
        .await?;
        tracing::info!(username = %username, "bootstrapped first user");
        id
    } else {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, hashed_password, salt, iterations FROM users WHERE username = $1",
        )
        .bind(&username)
        .fetch_optional(&state.pool)
        .await?;
        authenticate(row, &password)?
    };

    let token = state.tokens.issue(&user_id)?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// POST /auth/change-password. Existing tokens stay valid until expiry; a
/// password change does not revoke them.
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (current, new) = match (body.current_password, body.new_password) {
        (Some(c), Some(n)) if !c.is_empty() && !n.is_empty() => (c, n),
        _ => {
            return Err(AppError::BadRequest(
                "currentPassword and newPassword are required".into(),
            ))
        }
    };

    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, hashed_password, salt, iterations FROM users WHERE id = $1",
    )
    .bind(&auth.user_id)
    .fetch_optional(&state.pool)
    .await?;
    let user = row.ok_or_else(|| AppError::NotFound(format!("user {}", auth.user_id)))?;

    if !verify_password(
        &current,
        &user.salt,
        user.iterations as u32,
        &user.hashed_password,
    ) {
        return Err(AppError::Forbidden("current password is incorrect".into()));
    }

    let salt = generate_salt();
    let digest = hash_password(&new, &salt, DEFAULT_ITERATIONS);
    sqlx::query(
        "UPDATE users SET hashed_password = $1, salt = $2, hash_version = $3, iterations = $4, algorithm = $5 \
         WHERE id = $6",
    )
    .bind(&digest)
    .bind(&salt)
    .bind(HASH_VERSION)
    .bind(DEFAULT_ITERATIONS as i32)
    .bind(ALGORITHM)
    .bind(&user.id)
    .execute(&state.pool)
    .await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: u32 = 1_000;

    fn user(password: &str) -> UserRow {
        let salt = generate_salt();
        UserRow {
            id: "user-1".into(),
            hashed_password: hash_password(password, &salt, N),
            salt,
            iterations: N as i32,
        }
    }

    #[test]
    fn bootstrap_only_on_empty_user_table() {
        assert!(bootstrap_allowed(0));
        assert!(!bootstrap_allowed(1));
        assert!(!bootstrap_allowed(42));
    }

    #[test]
    fn authenticate_resolves_the_user_id() {
        let id = authenticate(Some(user("p")), "p").unwrap();
        assert_eq!(id, "user-1");
    }

    #[test]
    fn absent_user_is_invalid_credentials() {
        assert!(matches!(
            authenticate(None, "p"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        assert!(matches!(
            authenticate(Some(user("p")), "q"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn verification_uses_the_stored_iteration_count() {
        // The fixture hashes under a smaller cost factor than the current
        // default; verification must follow the row, not the default.
        assert_ne!(N, DEFAULT_ITERATIONS);
        assert!(authenticate(Some(user("p")), "p").is_ok());
    }
}
