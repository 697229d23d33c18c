//! User management: list, create, delete. Every route requires a token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::password::{ALGORITHM, HASH_VERSION};
use crate::auth::{generate_salt, hash_password, AuthUser, DEFAULT_ITERATIONS};
use crate::error::{is_unique_violation, AppError};
use crate::state::AppState;

#[derive(Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

/// GET /users — id and username only; credential material never leaves the
/// users table.
pub async fn list_users(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let rows: Vec<UserSummary> = sqlx::query_as("SELECT id, username FROM users")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /users. Duplicate usernames answer 409; the UNIQUE constraint on
/// users.username backs the pre-check, so a concurrent duplicate insert also
/// maps to 409 rather than a bare 500.
pub async fn create_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserSummary>), AppError> {
    let (username, password) = match (body.username, body.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(AppError::BadRequest(
                "username and password are required".into(),
            ))
        }
    };

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&state.pool)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(format!(
            "username already exists: {username}"
        )));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let salt = generate_salt();
    let digest = hash_password(&password, &salt, DEFAULT_ITERATIONS);
    let result = sqlx::query(
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
    .await;
    if let Err(e) = result {
        if is_unique_violation(&e) {
            return Err(AppError::Conflict(format!(
                "username already exists: {username}"
            )));
        }
        return Err(e.into());
    }

    Ok((StatusCode::CREATED, Json(UserSummary { id, username })))
}

/// Self-delete is forbidden regardless of how valid the token is otherwise.
pub fn ensure_not_self(path_id: &str, auth_user_id: &str) -> Result<(), AppError> {
    if path_id == auth_user_id {
        return Err(AppError::Forbidden("cannot delete your own account".into()));
    }
    Ok(())
}

/// DELETE /users/:id.
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ensure_not_self(&id, &auth.user_id)?;
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(&id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
