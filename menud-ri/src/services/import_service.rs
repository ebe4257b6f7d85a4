//! Document import service
//!
//! Walks a parsed menu document applying idempotent find-or-create at each
//! level (restaurant → menu → menu item), creates link records between menus
//! and items, and accumulates created/linked/failed counts.
//!
//! Failure isolation is per record: a validation fault at any level counts
//! against that level's failure counter and skips only that branch, never
//! its siblings. Infrastructure faults (the store itself failing) propagate
//! to the caller and abort the run.

use menud_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::links::{self, LinkAttributes, LinkResult};
use crate::db::{menu_items, menus, restaurants};
use crate::models::{ImportCounts, MenuDocument, MenuItemEntry};

/// Imports one parsed document on behalf of one import run.
///
/// The run id is carried only for log correlation; the service persists
/// nothing beyond the entity upserts and returns the aggregate counters to
/// the import job.
pub struct ImportService {
    pool: SqlitePool,
    run_id: Uuid,
}

impl ImportService {
    pub fn new(pool: SqlitePool, run_id: Uuid) -> Self {
        Self { pool, run_id }
    }

    /// Import the document, returning the eight aggregate counters.
    pub async fn call(&self, document: &MenuDocument) -> Result<ImportCounts> {
        let mut counts = ImportCounts::default();

        for restaurant_entry in &document.restaurants {
            let restaurant = match restaurants::find_or_create_restaurant(
                &self.pool,
                restaurant_entry.name.as_deref(),
            )
            .await
            {
                Ok((restaurant, true)) => {
                    counts.created_restaurants += 1;
                    tracing::info!(
                        run_id = %self.run_id,
                        restaurant = %restaurant.name,
                        "Created restaurant"
                    );
                    restaurant
                }
                Ok((restaurant, false)) => {
                    tracing::info!(
                        run_id = %self.run_id,
                        restaurant = %restaurant.name,
                        "Found restaurant"
                    );
                    restaurant
                }
                Err(Error::InvalidInput(msg)) => {
                    counts.failed_restaurants += 1;
                    tracing::warn!(
                        run_id = %self.run_id,
                        name = restaurant_entry.name.as_deref().unwrap_or(""),
                        error = %msg,
                        "Failed creating restaurant"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            for menu_entry in &restaurant_entry.menus {
                let menu = match menus::find_or_create_menu(
                    &self.pool,
                    restaurant.id,
                    menu_entry.name.as_deref(),
                )
                .await
                {
                    Ok((menu, true)) => {
                        counts.created_menus += 1;
                        tracing::info!(
                            run_id = %self.run_id,
                            menu = %menu.name,
                            restaurant = %restaurant.name,
                            "Created menu"
                        );
                        menu
                    }
                    Ok((menu, false)) => {
                        tracing::info!(
                            run_id = %self.run_id,
                            menu = %menu.name,
                            restaurant = %restaurant.name,
                            "Found menu"
                        );
                        menu
                    }
                    Err(Error::InvalidInput(msg)) => {
                        counts.failed_menus += 1;
                        tracing::warn!(
                            run_id = %self.run_id,
                            name = menu_entry.name.as_deref().unwrap_or(""),
                            restaurant = %restaurant.name,
                            error = %msg,
                            "Failed creating menu"
                        );
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                for item_entry in menu_entry.items() {
                    let item = match menu_items::find_or_create_menu_item(
                        &self.pool,
                        item_entry.name.as_deref(),
                    )
                    .await
                    {
                        Ok((item, true)) => {
                            counts.created_menu_items += 1;
                            tracing::info!(
                                run_id = %self.run_id,
                                item = %item.name,
                                "Created menu item"
                            );
                            item
                        }
                        Ok((item, false)) => {
                            tracing::info!(
                                run_id = %self.run_id,
                                item = %item.name,
                                "Found menu item"
                            );
                            item
                        }
                        Err(Error::InvalidInput(msg)) => {
                            counts.failed_menu_items += 1;
                            tracing::warn!(
                                run_id = %self.run_id,
                                name = item_entry.name.as_deref().unwrap_or(""),
                                error = %msg,
                                "Failed creating menu item"
                            );
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    // Re-importing an already-linked item is a true no-op:
                    // neither linked nor failed moves.
                    if links::link_exists(&self.pool, menu.id, item.id).await? {
                        continue;
                    }

                    let attrs = link_attributes(item_entry);
                    match links::create_link(&self.pool, menu.id, item.id, &attrs).await? {
                        LinkResult::Created(_) => {
                            counts.linked_menu_items += 1;
                            tracing::info!(
                                run_id = %self.run_id,
                                item = %item.name,
                                menu = %menu.name,
                                "Added menu item to menu"
                            );
                        }
                        LinkResult::Invalid(errors) => {
                            counts.failed_links += 1;
                            tracing::warn!(
                                run_id = %self.run_id,
                                item = %item.name,
                                menu = %menu.name,
                                errors = %errors.join(", "),
                                "Failed adding menu item to menu"
                            );
                        }
                    }
                }
            }
        }

        Ok(counts)
    }
}

fn link_attributes(entry: &MenuItemEntry) -> LinkAttributes {
    LinkAttributes {
        price: entry.price.clone(),
        currency: entry.currency.clone(),
        description: entry.description.clone(),
        category: entry.category.clone(),
        available: entry.available,
        image_url: entry.image_url.clone(),
        prep_time_minutes: entry.prep_time_minutes,
    }
}
