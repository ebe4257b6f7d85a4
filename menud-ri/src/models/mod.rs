//! Data models for menud-ri

pub mod document;
pub mod import_run;

pub use document::{MenuDocument, MenuEntry, MenuItemEntry, PriceValue, RestaurantEntry};
pub use import_run::{ImportCounts, ImportRun, ImportRunStatus};
