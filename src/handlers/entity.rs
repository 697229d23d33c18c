//! Generic entity CRUD handlers, resolved by URL path segment. List and get
//! are public; create, update, and delete require a token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::model::EntityDescriptor;
use crate::service::CrudService;
use crate::state::AppState;

fn resolve<'a>(state: &'a AppState, path_segment: &str) -> Result<&'a EntityDescriptor, AppError> {
    state
        .registry
        .entity_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(path_segment.to_string()))
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    let entity = resolve(&state, &path_segment)?;
    let rows = CrudService::list(&state.pool, entity).await?;
    Ok(Json(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve(&state, &path_segment)?;
    let row = CrudService::read(&state.pool, entity, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{path_segment}/{id}")))?;
    Ok(Json(row))
}

pub async fn create(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let entity = resolve(&state, &path_segment)?;
    let body = body_to_map(body)?;
    let row = CrudService::create(&state.pool, entity, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve(&state, &path_segment)?;
    let body = body_to_map(body)?;
    let row = CrudService::update(&state.pool, entity, &id, &body).await?;
    Ok(Json(row))
}

pub async fn delete(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((path_segment, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let entity = resolve(&state, &path_segment)?;
    CrudService::delete(&state.pool, entity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
