//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from an entity
//! descriptor. Column lists come from the descriptor only; values are always
//! parameter-bound.

use crate::model::EntityDescriptor;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from descriptors).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    /// All content columns are TEXT; bound as nullable strings.
    pub params: Vec<Option<String>>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Option<String>) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Convert a body value into its TEXT-column binding. Strings bind as-is;
/// other scalars bind as their JSON text (clients send numbers for date-ish
/// fields more often than one would like).
fn bind_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn column_list(entity: &EntityDescriptor) -> String {
    let mut cols = vec![quoted("id")];
    cols.extend(entity.columns.iter().map(|c| quoted(c.name)));
    cols.join(", ")
}

/// SELECT every row, storage-native order.
pub fn select_list(entity: &EntityDescriptor) -> String {
    format!(
        "SELECT {} FROM {}",
        column_list(entity),
        quoted(entity.table_name)
    )
}

/// SELECT by id. Caller binds the id as sole param.
pub fn select_by_id(entity: &EntityDescriptor) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        column_list(entity),
        quoted(entity.table_name),
        quoted("id")
    )
}

/// INSERT the generated id plus every defined (present) descriptor column.
pub fn insert(entity: &EntityDescriptor, id: &str, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = vec![quoted("id")];
    let n = q.push_param(Some(id.to_string()));
    let mut placeholders = vec![format!("${}", n)];
    for c in &entity.columns {
        let Some(v) = body.get(c.name) else { continue };
        let n = q.push_param(bind_text(v));
        cols.push(quoted(c.name));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(entity.table_name),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: SET only descriptor columns present in the body. Returns
/// None when no updatable field remains after filtering.
pub fn update(entity: &EntityDescriptor, id: &str, body: &Map<String, Value>) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &entity.columns {
        let Some(v) = body.get(c.name) else { continue };
        let n = q.push_param(bind_text(v));
        sets.push(format!("{} = ${}", quoted(c.name), n));
    }
    if sets.is_empty() {
        return None;
    }
    let id_param = q.push_param(Some(id.to_string()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        quoted(entity.table_name),
        sets.join(", "),
        quoted("id"),
        id_param
    );
    Some(q)
}

/// DELETE by id. Caller binds the id as sole param.
pub fn delete(entity: &EntityDescriptor) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        quoted(entity.table_name),
        quoted("id")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::registry;
    use serde_json::json;

    fn news() -> EntityDescriptor {
        registry().entity_by_path("news").unwrap().clone()
    }

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn insert_covers_only_defined_fields() {
        let q = insert(&news(), "abc", &body(json!({"title": "T", "date": "2024-01-01"})));
        assert_eq!(
            q.sql,
            "INSERT INTO \"news\" (\"id\", \"title\", \"date\") VALUES ($1, $2, $3)"
        );
        assert_eq!(
            q.params,
            vec![
                Some("abc".to_string()),
                Some("T".to_string()),
                Some("2024-01-01".to_string())
            ]
        );
    }

    #[test]
    fn insert_ignores_undeclared_keys() {
        let q = insert(&news(), "abc", &body(json!({"title": "T", "hacker": "x"})));
        assert!(!q.sql.contains("hacker"));
    }

    #[test]
    fn update_excludes_id_and_orders_params() {
        let q = update(&news(), "abc", &body(json!({"title": "T2", "id": "abc"}))).unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"news\" SET \"title\" = $1 WHERE \"id\" = $2"
        );
        assert_eq!(q.params, vec![Some("T2".into()), Some("abc".into())]);
    }

    #[test]
    fn update_with_no_updatable_fields_is_none() {
        assert!(update(&news(), "abc", &body(json!({"id": "abc"}))).is_none());
        assert!(update(&news(), "abc", &body(json!({}))).is_none());
    }

    #[test]
    fn nulls_bind_as_sql_null() {
        let q = insert(&news(), "abc", &body(json!({"title": null})));
        assert_eq!(q.params, vec![Some("abc".into()), None]);
    }

    #[test]
    fn non_string_scalars_bind_as_text() {
        let q = insert(&news(), "abc", &body(json!({"date": 20240101})));
        assert_eq!(q.params[1], Some("20240101".into()));
    }

    #[test]
    fn select_and_delete_shapes() {
        let e = news();
        assert_eq!(
            select_by_id(&e),
            "SELECT \"id\", \"title\", \"content\", \"date\", \"image_url\" FROM \"news\" WHERE \"id\" = $1"
        );
        assert_eq!(delete(&e), "DELETE FROM \"news\" WHERE \"id\" = $1");
        assert!(!select_list(&e).contains("ORDER BY"));
    }
}
