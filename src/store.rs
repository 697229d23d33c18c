//! First-run DDL: users table plus one table per entity descriptor.
//! Idempotent CREATE TABLE IF NOT EXISTS; not a migration framework.

use crate::error::AppError;
use crate::model::EntityRegistry;
use sqlx::PgPool;

/// Create the users table and every content table if absent. Username
/// uniqueness is enforced here, at the storage layer, so the registration
/// check-then-insert race cannot produce duplicates.
pub async fn ensure_tables(pool: &PgPool, registry: &EntityRegistry) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            salt TEXT NOT NULL,
            hash_version INT NOT NULL,
            iterations INT NOT NULL,
            algorithm TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for entity in registry.entities() {
        let cols: Vec<String> = std::iter::once("id TEXT PRIMARY KEY".to_string())
            .chain(
                entity
                    .columns
                    .iter()
                    .map(|c| format!("\"{}\" TEXT", c.name)),
            )
            .collect();
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
            entity.table_name,
            cols.join(", ")
        );
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}
