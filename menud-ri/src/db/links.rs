//! Menu ↔ menu item link records
//!
//! One link represents a menu item's appearance on one menu and carries the
//! per-appearance attributes (price, currency, category, availability,
//! description, prep time, image). Composite uniqueness: (menu, menu item).
//! The import pipeline never updates an existing link; re-importing an
//! already-linked item is a no-op.

use menud_common::{Error, Result};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use crate::models::PriceValue;

/// Link record
#[derive(Debug, Clone, Serialize)]
pub struct MenuMenuItem {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub menu_item_id: Uuid,
    pub price: f64,
    pub currency: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub available: bool,
    pub image_url: Option<String>,
    pub prep_time_minutes: Option<i64>,
}

/// Per-appearance attributes supplied when creating a link
#[derive(Debug, Clone, Default)]
pub struct LinkAttributes {
    pub price: Option<PriceValue>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub available: Option<bool>,
    pub image_url: Option<String>,
    pub prep_time_minutes: Option<i64>,
}

/// Outcome of a link creation attempt
///
/// Validation failures are data, not errors; only infrastructure faults
/// surface as `Err` from `create_link`.
#[derive(Debug)]
pub enum LinkResult {
    Created(MenuMenuItem),
    Invalid(Vec<String>),
}

fn row_to_link(row: &SqliteRow) -> Result<MenuMenuItem> {
    let id: String = row.get("id");
    let menu_id: String = row.get("menu_id");
    let menu_item_id: String = row.get("menu_item_id");
    Ok(MenuMenuItem {
        id: Uuid::parse_str(&id).map_err(|e| Error::Internal(format!("Bad link id {}: {}", id, e)))?,
        menu_id: Uuid::parse_str(&menu_id)
            .map_err(|e| Error::Internal(format!("Bad menu id {}: {}", menu_id, e)))?,
        menu_item_id: Uuid::parse_str(&menu_item_id)
            .map_err(|e| Error::Internal(format!("Bad menu item id {}: {}", menu_item_id, e)))?,
        price: row.get("price"),
        currency: row.get("currency"),
        description: row.get("description"),
        category: row.get("category"),
        available: row.get::<i64, _>("available") != 0,
        image_url: row.get("image_url"),
        prep_time_minutes: row.get("prep_time_minutes"),
    })
}

/// Check whether a link between this menu and this item already exists
pub async fn link_exists(pool: &SqlitePool, menu_id: Uuid, menu_item_id: Uuid) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM menu_menu_items WHERE menu_id = ? AND menu_item_id = ?")
        .bind(menu_id.to_string())
        .bind(menu_item_id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Create a link between a menu and a menu item.
///
/// Validates the per-appearance attributes first; validation failures come
/// back as `LinkResult::Invalid` with human-readable messages.
pub async fn create_link(
    pool: &SqlitePool,
    menu_id: Uuid,
    menu_item_id: Uuid,
    attrs: &LinkAttributes,
) -> Result<LinkResult> {
    let mut errors = Vec::new();

    let price = match &attrs.price {
        None => {
            errors.push("Price can't be blank".to_string());
            None
        }
        Some(value) => match value.as_decimal() {
            None => {
                errors.push("Price is not a number".to_string());
                None
            }
            Some(price) if price < 0.0 => {
                errors.push("Price must be greater than or equal to 0".to_string());
                None
            }
            Some(price) => Some(price),
        },
    };

    // Currency defaults when absent; a supplied blank is a validation error
    let currency = match &attrs.currency {
        None => "USD",
        Some(c) if c.trim().is_empty() => {
            errors.push("Currency can't be blank".to_string());
            ""
        }
        Some(c) => c.as_str(),
    };

    let price = match price {
        Some(price) if errors.is_empty() => price,
        _ => return Ok(LinkResult::Invalid(errors)),
    };

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO menu_menu_items (
            id, menu_id, menu_item_id, price, currency, description,
            category, available, image_url, prep_time_minutes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(menu_id, menu_item_id) DO NOTHING
        "#,
    )
    .bind(id.to_string())
    .bind(menu_id.to_string())
    .bind(menu_item_id.to_string())
    .bind(price)
    .bind(currency)
    .bind(&attrs.description)
    .bind(&attrs.category)
    .bind(attrs.available.unwrap_or(true) as i64)
    .bind(&attrs.image_url)
    .bind(attrs.prep_time_minutes)
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT * FROM menu_menu_items WHERE menu_id = ? AND menu_item_id = ?")
        .bind(menu_id.to_string())
        .bind(menu_item_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(LinkResult::Created(row_to_link(&row)?))
}

/// Link rows for one menu joined with the item name, for the menu surface
#[derive(Debug, Clone, Serialize)]
pub struct LinkedItem {
    pub name: String,
    #[serde(flatten)]
    pub link: MenuMenuItem,
}

pub async fn list_links_for_menu(pool: &SqlitePool, menu_id: Uuid) -> Result<Vec<LinkedItem>> {
    let rows = sqlx::query(
        r#"
        SELECT l.*, i.name AS item_name
        FROM menu_menu_items l
        JOIN menu_items i ON i.id = l.menu_item_id
        WHERE l.menu_id = ?
        ORDER BY l.created_at
        "#,
    )
    .bind(menu_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(LinkedItem {
                name: row.get("item_name"),
                link: row_to_link(row)?,
            })
        })
        .collect()
}

/// Remove a link record
pub async fn delete_link(pool: &SqlitePool, menu_id: Uuid, menu_item_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM menu_menu_items WHERE menu_id = ? AND menu_item_id = ?")
        .bind(menu_id.to_string())
        .bind(menu_item_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Menu item is not on this menu".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::menu_items::find_or_create_menu_item;
    use crate::db::menus::find_or_create_menu;
    use crate::db::restaurants::find_or_create_restaurant;
    use crate::db::test_pool;

    async fn fixture(pool: &SqlitePool) -> (Uuid, Uuid) {
        let (r, _) = find_or_create_restaurant(pool, Some("R")).await.unwrap();
        let (m, _) = find_or_create_menu(pool, r.id, Some("M")).await.unwrap();
        let (i, _) = find_or_create_menu_item(pool, Some("Burger")).await.unwrap();
        (m.id, i.id)
    }

    #[tokio::test]
    async fn create_then_exists() {
        let pool = test_pool().await;
        let (menu_id, item_id) = fixture(&pool).await;

        assert!(!link_exists(&pool, menu_id, item_id).await.unwrap());

        let attrs = LinkAttributes {
            price: Some(PriceValue::Number(12.99)),
            ..Default::default()
        };
        let result = create_link(&pool, menu_id, item_id, &attrs).await.unwrap();
        let link = match result {
            LinkResult::Created(link) => link,
            LinkResult::Invalid(errors) => panic!("unexpected validation errors: {:?}", errors),
        };
        assert_eq!(link.price, 12.99);
        assert_eq!(link.currency, "USD");
        assert!(link.available);

        assert!(link_exists(&pool, menu_id, item_id).await.unwrap());
    }

    #[tokio::test]
    async fn missing_price_is_a_validation_error() {
        let pool = test_pool().await;
        let (menu_id, item_id) = fixture(&pool).await;

        let result = create_link(&pool, menu_id, item_id, &LinkAttributes::default())
            .await
            .unwrap();
        match result {
            LinkResult::Invalid(errors) => {
                assert_eq!(errors, vec!["Price can't be blank".to_string()]);
            }
            LinkResult::Created(_) => panic!("link should not be created without a price"),
        }
        assert!(!link_exists(&pool, menu_id, item_id).await.unwrap());
    }

    #[tokio::test]
    async fn negative_and_unparseable_prices_are_rejected() {
        let pool = test_pool().await;
        let (menu_id, item_id) = fixture(&pool).await;

        for price in [
            PriceValue::Number(-1.0),
            PriceValue::Text("free".to_string()),
        ] {
            let attrs = LinkAttributes {
                price: Some(price),
                ..Default::default()
            };
            match create_link(&pool, menu_id, item_id, &attrs).await.unwrap() {
                LinkResult::Invalid(errors) => assert_eq!(errors.len(), 1),
                LinkResult::Created(_) => panic!("invalid price accepted"),
            }
        }
    }

    #[tokio::test]
    async fn string_price_is_coerced() {
        let pool = test_pool().await;
        let (menu_id, item_id) = fixture(&pool).await;

        let attrs = LinkAttributes {
            price: Some(PriceValue::Text("4.99".to_string())),
            currency: Some("EUR".to_string()),
            ..Default::default()
        };
        match create_link(&pool, menu_id, item_id, &attrs).await.unwrap() {
            LinkResult::Created(link) => {
                assert_eq!(link.price, 4.99);
                assert_eq!(link.currency, "EUR");
            }
            LinkResult::Invalid(errors) => panic!("unexpected validation errors: {:?}", errors),
        }
    }
}
