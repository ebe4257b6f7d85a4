//! Menu database operations
//!
//! Natural key: (restaurant id, exact `name`). A menu is only ever found or
//! created within the scope of the restaurant it belongs to.

use menud_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Menu record
#[derive(Debug, Clone, Serialize)]
pub struct Menu {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub active: bool,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Writable menu fields for the CRUD endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
}

fn row_to_menu(row: &SqliteRow) -> Result<Menu> {
    let id: String = row.get("id");
    let restaurant_id: String = row.get("restaurant_id");
    Ok(Menu {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(format!("Bad menu id {}: {}", id, e)))?,
        restaurant_id: Uuid::parse_str(&restaurant_id)
            .map_err(|e| Error::Internal(format!("Bad restaurant id {}: {}", restaurant_id, e)))?,
        name: row.get("name"),
        description: row.get("description"),
        category: row.get("category"),
        active: row.get::<i64, _>("active") != 0,
        starts_at: row.get("starts_at"),
        ends_at: row.get("ends_at"),
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

/// Service hours must be whole hours, starts before ends
fn validate_hours(starts_at: Option<i64>, ends_at: Option<i64>) -> Result<()> {
    match (starts_at, ends_at) {
        (None, None) => Ok(()),
        (Some(s), Some(e)) => {
            if !(0..=23).contains(&s) || !(0..=23).contains(&e) {
                return Err(Error::InvalidInput(
                    "Hours must be a valid hour (0-23)".to_string(),
                ));
            }
            if s >= e {
                return Err(Error::InvalidInput(
                    "Start time must be before end time".to_string(),
                ));
            }
            Ok(())
        }
        _ => Err(Error::InvalidInput(
            "Both starts_at and ends_at must be present".to_string(),
        )),
    }
}

/// Find a menu by exact name within one restaurant, or create it if absent.
///
/// Returns the record and whether it was newly created.
pub async fn find_or_create_menu(
    pool: &SqlitePool,
    restaurant_id: Uuid,
    name: Option<&str>,
) -> Result<(Menu, bool)> {
    let name = validate_name(name)?;
    let restaurant_id_str = restaurant_id.to_string();

    let inserted = sqlx::query(
        r#"
        INSERT INTO menus (id, restaurant_id, name)
        VALUES (?, ?, ?)
        ON CONFLICT(restaurant_id, name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&restaurant_id_str)
    .bind(name)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM menus WHERE restaurant_id = ? AND name = ?")
        .bind(&restaurant_id_str)
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok((row_to_menu(&row)?, inserted.rows_affected() > 0))
}

/// List menus of one restaurant, newest first
pub async fn list_menus(
    pool: &SqlitePool,
    restaurant_id: Uuid,
    page: u32,
    per_page: u32,
) -> Result<Vec<Menu>> {
    let offset = (i64::from(page.max(1)) - 1) * i64::from(per_page);
    let rows = sqlx::query(
        "SELECT * FROM menus WHERE restaurant_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(restaurant_id.to_string())
    .bind(per_page as i64)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_menu).collect()
}

/// Load a menu by id, scoped to its restaurant
pub async fn get_menu(pool: &SqlitePool, restaurant_id: Uuid, id: Uuid) -> Result<Option<Menu>> {
    let row = sqlx::query("SELECT * FROM menus WHERE id = ? AND restaurant_id = ?")
        .bind(id.to_string())
        .bind(restaurant_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_menu).transpose()
}

/// Create a menu from the CRUD surface
pub async fn create_menu(
    pool: &SqlitePool,
    restaurant_id: Uuid,
    fields: &MenuFields,
) -> Result<Menu> {
    let name = validate_name(fields.name.as_deref())?;
    validate_hours(fields.starts_at, fields.ends_at)?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO menus (id, restaurant_id, name, description, category, active, starts_at, ends_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(restaurant_id.to_string())
    .bind(name)
    .bind(&fields.description)
    .bind(&fields.category)
    .bind(fields.active.unwrap_or(true) as i64)
    .bind(fields.starts_at)
    .bind(fields.ends_at)
    .execute(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::InvalidInput("Name has already been taken for this restaurant".to_string())
        }
        _ => Error::Database(e),
    })?;

    get_menu(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| Error::Internal("Menu vanished after insert".to_string()))
}

/// Update menu fields; only provided fields change
pub async fn update_menu(
    pool: &SqlitePool,
    restaurant_id: Uuid,
    id: Uuid,
    fields: &MenuFields,
) -> Result<Menu> {
    let existing = get_menu(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Menu not found: {}", id)))?;

    if let Some(name) = &fields.name {
        validate_name(Some(name))?;
    }
    let starts_at = fields.starts_at.or(existing.starts_at);
    let ends_at = fields.ends_at.or(existing.ends_at);
    validate_hours(starts_at, ends_at)?;

    sqlx::query(
        r#"
        UPDATE menus SET
            name = ?, description = ?, category = ?, active = ?,
            starts_at = ?, ends_at = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(fields.name.as_ref().unwrap_or(&existing.name))
    .bind(fields.description.as_ref().or(existing.description.as_ref()))
    .bind(fields.category.as_ref().or(existing.category.as_ref()))
    .bind(fields.active.unwrap_or(existing.active) as i64)
    .bind(starts_at)
    .bind(ends_at)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    get_menu(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| Error::Internal("Menu vanished after update".to_string()))
}

/// Delete a menu and its link records
pub async fn delete_menu(pool: &SqlitePool, restaurant_id: Uuid, id: Uuid) -> Result<()> {
    let existing = get_menu(pool, restaurant_id, id).await?;
    if existing.is_none() {
        return Err(Error::NotFound(format!("Menu not found: {}", id)));
    }

    sqlx::query("DELETE FROM menu_menu_items WHERE menu_id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM menus WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}
