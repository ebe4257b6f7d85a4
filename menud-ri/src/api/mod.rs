//! HTTP API handlers for menud-ri

pub mod health;
pub mod import;
pub mod menu_items;
pub mod menus;
pub mod restaurants;

pub use health::health_routes;
pub use import::import_routes;
pub use menu_items::menu_item_routes;
pub use menus::menu_routes;
pub use restaurants::restaurant_routes;

use serde::Deserialize;

/// Shared pagination query parameters for the index endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}
