//! The six content entities served by the generic CRUD surface.

use crate::model::{ColumnInfo, EntityDescriptor, EntityRegistry, FieldKind, JsonShape};

fn text(name: &'static str) -> ColumnInfo {
    ColumnInfo {
        name,
        kind: FieldKind::Text,
    }
}

fn json(name: &'static str, shape: JsonShape) -> ColumnInfo {
    ColumnInfo {
        name,
        kind: FieldKind::Json(shape),
    }
}

pub fn registry() -> EntityRegistry {
    EntityRegistry::new(vec![
        EntityDescriptor {
            table_name: "leaders",
            columns: vec![
                text("name"),
                text("state"),
                text("position"),
                text("bio"),
                text("image_url"),
                json("social", JsonShape::Object),
                json("protests", JsonShape::Array),
                json("achievements", JsonShape::Array),
            ],
        },
        EntityDescriptor {
            table_name: "news",
            columns: vec![
                text("title"),
                text("content"),
                text("date"),
                text("image_url"),
            ],
        },
        EntityDescriptor {
            table_name: "activities",
            columns: vec![
                text("title"),
                text("description"),
                text("date"),
                text("image_url"),
                json("stats", JsonShape::Array),
            ],
        },
        EntityDescriptor {
            table_name: "videos",
            columns: vec![text("title"), text("youtube_url"), text("date")],
        },
        EntityDescriptor {
            table_name: "gallery_items",
            columns: vec![text("title"), text("image_url"), text("date")],
        },
        EntityDescriptor {
            table_name: "executive_leaders",
            columns: vec![
                text("name"),
                text("designation"),
                text("image_url"),
                json("social_media", JsonShape::Object),
            ],
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_all_path_segments() {
        let reg = registry();
        for path in [
            "leaders",
            "news",
            "activities",
            "videos",
            "gallery_items",
            "executive_leaders",
        ] {
            assert!(reg.entity_by_path(path).is_some(), "missing {path}");
        }
        assert!(reg.entity_by_path("users").is_none());
        assert!(reg.entity_by_path("unknown").is_none());
    }

    #[test]
    fn leaders_carry_three_structured_columns() {
        let reg = registry();
        let leaders = reg.entity_by_path("leaders").unwrap();
        let json_cols: Vec<_> = leaders.json_columns().collect();
        assert_eq!(
            json_cols,
            vec![
                ("social", JsonShape::Object),
                ("protests", JsonShape::Array),
                ("achievements", JsonShape::Array),
            ]
        );
    }

    #[test]
    fn news_is_identity_transform() {
        let reg = registry();
        let news = reg.entity_by_path("news").unwrap();
        assert_eq!(news.json_columns().count(), 0);
    }
}
