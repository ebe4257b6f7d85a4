//! Restaurant database operations
//!
//! Natural key: exact `name` (case-sensitive, unique).

use menud_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Restaurant record
#[derive(Debug, Clone, Serialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Writable restaurant fields for the CRUD endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub website_url: Option<String>,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
}

fn row_to_restaurant(row: &SqliteRow) -> Result<Restaurant> {
    let id: String = row.get("id");
    Ok(Restaurant {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("Bad restaurant id {}: {}", id, e)))?,
        name: row.get("name"),
        description: row.get("description"),
        address_line_1: row.get("address_line_1"),
        address_line_2: row.get("address_line_2"),
        city: row.get("city"),
        state: row.get("state"),
        zip_code: row.get("zip_code"),
        phone_number: row.get("phone_number"),
        email: row.get("email"),
        website_url: row.get("website_url"),
        logo_url: row.get("logo_url"),
        cover_image_url: row.get("cover_image_url"),
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

/// Find a restaurant by exact name, or create it if absent.
///
/// Returns the record and whether it was newly created. Atomic under
/// concurrent runs: the INSERT hits the unique constraint instead of racing
/// a prior SELECT.
pub async fn find_or_create_restaurant(
    pool: &SqlitePool,
    name: Option<&str>,
) -> Result<(Restaurant, bool)> {
    let name = validate_name(name)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO restaurants (id, name)
        VALUES (?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM restaurants WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok((row_to_restaurant(&row)?, inserted.rows_affected() > 0))
}

/// List restaurants, newest first
pub async fn list_restaurants(
    pool: &SqlitePool,
    page: u32,
    per_page: u32,
) -> Result<Vec<Restaurant>> {
    let offset = (i64::from(page.max(1)) - 1) * i64::from(per_page);
    let rows = sqlx::query("SELECT * FROM restaurants ORDER BY created_at DESC LIMIT ? OFFSET ?")
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_restaurant).collect()
}

/// Load a restaurant by id
pub async fn get_restaurant(pool: &SqlitePool, id: Uuid) -> Result<Option<Restaurant>> {
    let row = sqlx::query("SELECT * FROM restaurants WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_restaurant).transpose()
}

/// Create a restaurant from the CRUD surface
pub async fn create_restaurant(pool: &SqlitePool, fields: &RestaurantFields) -> Result<Restaurant> {
    let name = validate_name(fields.name.as_deref())?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO restaurants (
            id, name, description, address_line_1, address_line_2, city, state,
            zip_code, phone_number, email, website_url, logo_url, cover_image_url
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(name)
    .bind(&fields.description)
    .bind(&fields.address_line_1)
    .bind(&fields.address_line_2)
    .bind(&fields.city)
    .bind(&fields.state)
    .bind(&fields.zip_code)
    .bind(&fields.phone_number)
    .bind(&fields.email)
    .bind(&fields.website_url)
    .bind(&fields.logo_url)
    .bind(&fields.cover_image_url)
    .execute(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::InvalidInput("Name has already been taken".to_string())
        }
        _ => Error::Database(e),
    })?;

    get_restaurant(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Restaurant vanished after insert".to_string()))
}

/// Update restaurant fields; only provided fields change
pub async fn update_restaurant(
    pool: &SqlitePool,
    id: Uuid,
    fields: &RestaurantFields,
) -> Result<Restaurant> {
    let existing = get_restaurant(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Restaurant not found: {}", id)))?;

    if let Some(name) = &fields.name {
        validate_name(Some(name))?;
    }

    sqlx::query(
        r#"
        UPDATE restaurants SET
            name = ?, description = ?, address_line_1 = ?, address_line_2 = ?,
            city = ?, state = ?, zip_code = ?, phone_number = ?, email = ?,
            website_url = ?, logo_url = ?, cover_image_url = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(fields.name.as_ref().unwrap_or(&existing.name))
    .bind(fields.description.as_ref().or(existing.description.as_ref()))
    .bind(fields.address_line_1.as_ref().or(existing.address_line_1.as_ref()))
    .bind(fields.address_line_2.as_ref().or(existing.address_line_2.as_ref()))
    .bind(fields.city.as_ref().or(existing.city.as_ref()))
    .bind(fields.state.as_ref().or(existing.state.as_ref()))
    .bind(fields.zip_code.as_ref().or(existing.zip_code.as_ref()))
    .bind(fields.phone_number.as_ref().or(existing.phone_number.as_ref()))
    .bind(fields.email.as_ref().or(existing.email.as_ref()))
    .bind(fields.website_url.as_ref().or(existing.website_url.as_ref()))
    .bind(fields.logo_url.as_ref().or(existing.logo_url.as_ref()))
    .bind(fields.cover_image_url.as_ref().or(existing.cover_image_url.as_ref()))
    .bind(id.to_string())
    .execute(pool)
    .await?;

    get_restaurant(pool, id)
        .await?
        .ok_or_else(|| Error::Internal("Restaurant vanished after update".to_string()))
}

/// Delete a restaurant and its dependent menus and links
pub async fn delete_restaurant(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let id_str = id.to_string();

    let existing = sqlx::query("SELECT id FROM restaurants WHERE id = ?")
        .bind(&id_str)
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        return Err(Error::NotFound(format!("Restaurant not found: {}", id)));
    }

    sqlx::query(
        "DELETE FROM menu_menu_items WHERE menu_id IN (SELECT id FROM menus WHERE restaurant_id = ?)",
    )
    .bind(&id_str)
    .execute(pool)
    .await?;
    sqlx::query("DELETE FROM menus WHERE restaurant_id = ?")
        .bind(&id_str)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM restaurants WHERE id = ?")
        .bind(&id_str)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn find_or_create_reports_created_then_found() {
        let pool = test_pool().await;

        let (first, created) = find_or_create_restaurant(&pool, Some("Luigi's")).await.unwrap();
        assert!(created);

        let (second, created) = find_or_create_restaurant(&pool, Some("Luigi's")).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn name_is_case_sensitive() {
        let pool = test_pool().await;

        let (a, _) = find_or_create_restaurant(&pool, Some("Cafe")).await.unwrap();
        let (b, created) = find_or_create_restaurant(&pool, Some("cafe")).await.unwrap();
        assert!(created);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn blank_name_is_invalid_input() {
        let pool = test_pool().await;

        for name in [None, Some(""), Some("   ")] {
            let err = find_or_create_restaurant(&pool, name).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name() {
        let pool = test_pool().await;
        let fields = RestaurantFields {
            name: Some("Dup".to_string()),
            ..Default::default()
        };

        create_restaurant(&pool, &fields).await.unwrap();
        let err = create_restaurant(&pool, &fields).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let pool = test_pool().await;
        let created = create_restaurant(
            &pool,
            &RestaurantFields {
                name: Some("Old".to_string()),
                city: Some("Lisbon".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = update_restaurant(
            &pool,
            created.id,
            &RestaurantFields {
                name: Some("New".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.city.as_deref(), Some("Lisbon"));

        delete_restaurant(&pool, created.id).await.unwrap();
        assert!(get_restaurant(&pool, created.id).await.unwrap().is_none());
    }
}
