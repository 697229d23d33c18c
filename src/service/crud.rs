//! Generic CRUD execution against PostgreSQL, shared by all content entities.
//!
//! Create and update answer with the deserialized in-memory record, not a
//! re-read of the persisted row.

use crate::error::AppError;
use crate::model::EntityDescriptor;
use crate::sql::{delete, insert, select_by_id, select_list, update, QueryBuf};
use crate::transform::{deserialize_record, serialize_body};
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};

pub struct CrudService;

impl CrudService {
    /// Every row, storage-native order.
    pub async fn list(pool: &PgPool, entity: &EntityDescriptor) -> Result<Vec<Value>, AppError> {
        let sql = select_list(entity);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        Ok(rows
            .iter()
            .map(|r| deserialize_record(entity, &row_to_map(entity, r)))
            .collect())
    }

    /// One row by id, or None.
    pub async fn read(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: &str,
    ) -> Result<Option<Value>, AppError> {
        let sql = select_by_id(entity);
        tracing::debug!(sql = %sql, id = %id, "query");
        let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
        Ok(row.map(|r| deserialize_record(entity, &row_to_map(entity, &r))))
    }

    /// Insert with a server-generated id; any client-supplied id is ignored.
    /// Returns the deserialized in-memory record.
    pub async fn create(
        pool: &PgPool,
        entity: &EntityDescriptor,
        body: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let stored = serialize_body(entity, body);
        let q = insert(entity, &id, &stored);
        Self::execute(pool, &q).await?;
        let mut record = stored;
        record.insert("id".into(), Value::String(id));
        Ok(deserialize_record(entity, &record))
    }

    /// Partial UPDATE over the defined fields. The body id must equal the
    /// path id; a body with nothing updatable is rejected.
    pub async fn update(
        pool: &PgPool,
        entity: &EntityDescriptor,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        ensure_id_matches(id, body)?;
        let stored = serialize_body(entity, body);
        let q = update(entity, id, &stored).ok_or_else(|| {
            AppError::BadRequest("no updatable fields in request body".into())
        })?;
        let affected = Self::execute(pool, &q).await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("{}/{}", entity.table_name, id)));
        }
        let mut record = stored;
        record.insert("id".into(), Value::String(id.to_string()));
        Ok(deserialize_record(entity, &record))
    }

    /// Delete by id; deletion is immediate and final.
    pub async fn delete(pool: &PgPool, entity: &EntityDescriptor, id: &str) -> Result<(), AppError> {
        let sql = delete(entity);
        tracing::debug!(sql = %sql, id = %id, "query");
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{}/{}", entity.table_name, id)));
        }
        Ok(())
    }

    async fn execute(pool: &PgPool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.as_deref());
        }
        let result = query.execute(pool).await?;
        Ok(result.rows_affected())
    }
}

/// The id in the URL path must equal the id in the payload body.
pub fn ensure_id_matches(path_id: &str, body: &Map<String, Value>) -> Result<(), AppError> {
    match body.get("id") {
        Some(Value::String(s)) if s == path_id => Ok(()),
        _ => Err(AppError::BadRequest(
            "id in request body must match id in path".into(),
        )),
    }
}

fn row_to_map(entity: &EntityDescriptor, row: &sqlx::postgres::PgRow) -> Map<String, Value> {
    let mut map = Map::new();
    let id: Option<String> = row.try_get("id").ok().flatten();
    map.insert(
        "id".into(),
        id.map(Value::String).unwrap_or(Value::Null),
    );
    for c in &entity.columns {
        let v: Option<String> = row.try_get(c.name).ok().flatten();
        map.insert(
            c.name.to_string(),
            v.map(Value::String).unwrap_or(Value::Null),
        );
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn id_mismatch_is_rejected() {
        let err = ensure_id_matches("A", &body(json!({"id": "B", "name": "x"}))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn missing_body_id_is_rejected() {
        let err = ensure_id_matches("A", &body(json!({"name": "x"}))).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn matching_id_passes() {
        assert!(ensure_id_matches("A", &body(json!({"id": "A"}))).is_ok());
    }
}
