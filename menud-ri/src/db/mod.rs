//! Database access for menud-ri
//!
//! SQLite store offering the upsert primitives the import pipeline relies
//! on: find-or-create by natural key (atomic via unique constraints) and
//! link-record creation.

pub mod import_runs;
pub mod links;
pub mod menu_items;
pub mod menus;
pub mod restaurants;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to menud.db in the root folder, creating it if missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize menud-ri tables
///
/// Creates the entity tables and import_runs if they don't exist. The
/// UNIQUE constraints back the atomicity of find-or-create; hand-rolled
/// look-up-then-insert would be racy under concurrent runs.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS restaurants (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            address_line_1 TEXT,
            address_line_2 TEXT,
            city TEXT,
            state TEXT,
            zip_code TEXT,
            phone_number TEXT,
            email TEXT,
            website_url TEXT,
            logo_url TEXT,
            cover_image_url TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS menus (
            id TEXT PRIMARY KEY,
            restaurant_id TEXT NOT NULL REFERENCES restaurants(id),
            name TEXT NOT NULL,
            description TEXT,
            category TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            starts_at INTEGER,
            ends_at INTEGER,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(restaurant_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS menu_items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS menu_menu_items (
            id TEXT PRIMARY KEY,
            menu_id TEXT NOT NULL REFERENCES menus(id),
            menu_item_id TEXT NOT NULL REFERENCES menu_items(id),
            price REAL NOT NULL,
            currency TEXT NOT NULL DEFAULT 'USD',
            description TEXT,
            category TEXT,
            available INTEGER NOT NULL DEFAULT 1,
            image_url TEXT,
            prep_time_minutes INTEGER,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(menu_id, menu_item_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS import_runs (
            id TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'pending',
            document TEXT,
            started_at TEXT,
            finished_at TEXT,
            error_message TEXT,
            created_restaurants_count INTEGER NOT NULL DEFAULT 0,
            created_menus_count INTEGER NOT NULL DEFAULT 0,
            created_menu_items_count INTEGER NOT NULL DEFAULT 0,
            linked_menu_items_count INTEGER NOT NULL DEFAULT 0,
            failed_restaurants_count INTEGER NOT NULL DEFAULT 0,
            failed_menus_count INTEGER NOT NULL DEFAULT 0,
            failed_menu_items_count INTEGER NOT NULL DEFAULT 0,
            failed_links_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!(
        "Database tables initialized (restaurants, menus, menu_items, menu_menu_items, import_runs)"
    );

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    init_tables(&pool).await.unwrap();
    pool
}
