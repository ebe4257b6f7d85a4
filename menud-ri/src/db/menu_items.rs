//! Menu item database operations
//!
//! Natural key: exact `name`, global. A menu item named "Caesar Salad" is
//! the same logical entity everywhere in the store; per-appearance pricing
//! lives on the link record, not here.

use menud_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Menu item record
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Writable menu item fields for the CRUD endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemFields {
    pub name: Option<String>,
}

fn row_to_menu_item(row: &SqliteRow) -> Result<MenuItem> {
    let id: String = row.get("id");
    Ok(MenuItem {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("Bad menu item id {}: {}", id, e)))?,
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn validate_name(name: Option<&str>) -> Result<&str> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(Error::InvalidInput("Name can't be blank".to_string())),
    }
}

/// Find a menu item by exact name, or create it if absent.
///
/// Returns the record and whether it was newly created.
pub async fn find_or_create_menu_item(
    pool: &SqlitePool,
    name: Option<&str>,
) -> Result<(MenuItem, bool)> {
    let name = validate_name(name)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO menu_items (id, name)
        VALUES (?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM menu_items WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok((row_to_menu_item(&row)?, inserted.rows_affected() > 0))
}

/// List menu items, newest first
pub async fn list_menu_items(pool: &SqlitePool, page: u32, per_page: u32) -> Result<Vec<MenuItem>> {
    let offset = (i64::from(page.max(1)) - 1) * i64::from(per_page);
    let rows = sqlx::query("SELECT * FROM menu_items ORDER BY created_at DESC LIMIT ? OFFSET ?")
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_menu_item).collect()
}

/// Load a menu item by id
pub async fn get_menu_item(pool: &SqlitePool, id: Uuid) -> Result<Option<MenuItem>> {
    let row = sqlx::query("SELECT * FROM menu_items WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_menu_item).transpose()
}

/// Create a menu item from the CRUD surface
pub async fn create_menu_item(pool: &SqlitePool, fields: &MenuItemFields) -> Result<MenuItem> {
    let name = validate_name(fields.name.as_deref())?;
    let id = Uuid::new_v4();

    sqlx::query("INSERT INTO menu_items (id, name) VALUES (?, ?)")
        .bind(id.to_string())
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::InvalidInput("Name has already been taken".to_string())
            }
            _ => Error::Database(e),
        })?;

    get_menu_item(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Menu item vanished after insert".to_string()))
}

/// Rename a menu item
pub async fn update_menu_item(
    pool: &SqlitePool,
    id: Uuid,
    fields: &MenuItemFields,
) -> Result<MenuItem> {
    let existing = get_menu_item(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Menu item not found: {}", id)))?;
    let name = match &fields.name {
        Some(name) => validate_name(Some(name))?,
        None => &existing.name,
    };

    sqlx::query("UPDATE menu_items SET name = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(name)
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::InvalidInput("Name has already been taken".to_string())
            }
            _ => Error::Database(e),
        })?;

    get_menu_item(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Menu item vanished after update".to_string()))
}

/// Delete a menu item and its link records
pub async fn delete_menu_item(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let existing = get_menu_item(pool, id).await?;
    if existing.is_none() {
        return Err(Error::NotFound(format!("Menu item not found: {}", id)));
    }

    sqlx::query("DELETE FROM menu_menu_items WHERE menu_item_id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM menu_items WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn menu_item_identity_is_global() {
        let pool = test_pool().await;

        let (first, created) = find_or_create_menu_item(&pool, Some("Caesar Salad")).await.unwrap();
        assert!(created);

        let (second, created) = find_or_create_menu_item(&pool, Some("Caesar Salad")).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn blank_name_is_invalid_input() {
        let pool = test_pool().await;

        let err = find_or_create_menu_item(&pool, Some("")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
