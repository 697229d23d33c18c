//! Entity descriptors: the declared shape of each content table.
//!
//! Column lists in SQL are built only from these descriptors, never from
//! client-supplied object keys. A descriptor names the table, the URL path
//! segment, and an ordered list of columns; JSON-kind columns are the ones a
//! transform pair serializes to text for storage.

use std::collections::HashMap;

/// Shape of a structured column, used for defaulting when the stored text is
/// absent or null.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    pub fn default_value(self) -> serde_json::Value {
        match self {
            JsonShape::Object => serde_json::Value::Object(serde_json::Map::new()),
            JsonShape::Array => serde_json::Value::Array(Vec::new()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored and returned as plain text.
    Text,
    /// Structured in the API, persisted as serialized JSON text.
    Json(JsonShape),
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// One content entity: table name doubles as the URL path segment.
#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    pub table_name: &'static str,
    /// Non-id columns, in table order.
    pub columns: Vec<ColumnInfo>,
}

impl EntityDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// JSON-kind columns, i.e. the entity's transform pair.
    pub fn json_columns(&self) -> impl Iterator<Item = (&'static str, JsonShape)> + '_ {
        self.columns.iter().filter_map(|c| match c.kind {
            FieldKind::Json(shape) => Some((c.name, shape)),
            FieldKind::Text => None,
        })
    }
}

/// All entities, resolvable by URL path segment.
#[derive(Clone, Debug)]
pub struct EntityRegistry {
    by_path: HashMap<&'static str, EntityDescriptor>,
}

impl EntityRegistry {
    pub fn new(entities: Vec<EntityDescriptor>) -> Self {
        let by_path = entities.into_iter().map(|e| (e.table_name, e)).collect();
        EntityRegistry { by_path }
    }

    pub fn entity_by_path(&self, path: &str) -> Option<&EntityDescriptor> {
        self.by_path.get(path)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.by_path.values()
    }
}
