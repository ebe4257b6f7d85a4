//! Uploaded menu document shape
//!
//! The producer hands the import pipeline an already JSON-decoded document:
//! `{ "restaurants": [ { "name", "menus": [ { "name", "menu_items"|"dishes":
//! [ { "name", "price", ... } ] } ] } ] }`. Every key is optional; missing
//! names surface as per-record validation failures inside the import loop,
//! never as document-level parse errors.

use serde::{Deserialize, Serialize};

/// Top-level uploaded document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuDocument {
    #[serde(default)]
    pub restaurants: Vec<RestaurantEntry>,
}

/// One restaurant entry in the document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub menus: Vec<MenuEntry>,
}

/// One menu entry under a restaurant
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub menu_items: Option<Vec<MenuItemEntry>>,
    #[serde(default)]
    pub dishes: Option<Vec<MenuItemEntry>>,
}

impl MenuEntry {
    /// Item sequence for this menu.
    ///
    /// `menu_items` and `dishes` are ingestion synonyms; when both keys are
    /// present `menu_items` wins and `dishes` is ignored entirely.
    pub fn items(&self) -> &[MenuItemEntry] {
        match (&self.menu_items, &self.dishes) {
            (Some(items), _) => items,
            (None, Some(dishes)) => dishes,
            (None, None) => &[],
        }
    }
}

/// One menu item entry, carrying its per-appearance link attributes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<PriceValue>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub prep_time_minutes: Option<i64>,
}

/// Type-tolerant price value: JSON number or numeric string.
///
/// Anything else deserializes into `Other` so a malformed price fails link
/// validation for that one item instead of aborting the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl PriceValue {
    /// Coerce to a decimal: numbers pass through, strings are parsed as a
    /// plain decimal number. No locale or thousands-separator handling.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            PriceValue::Number(n) if n.is_finite() => Some(*n),
            PriceValue::Number(_) => None,
            PriceValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            PriceValue::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_items_take_precedence_over_dishes() {
        let menu: MenuEntry = serde_json::from_str(
            r#"{"name":"M","menu_items":[{"name":"A"}],"dishes":[{"name":"B"},{"name":"C"}]}"#,
        )
        .unwrap();
        let names: Vec<_> = menu.items().iter().map(|i| i.name.as_deref()).collect();
        assert_eq!(names, vec![Some("A")]);
    }

    #[test]
    fn dishes_used_when_menu_items_absent() {
        let menu: MenuEntry =
            serde_json::from_str(r#"{"name":"M","dishes":[{"name":"B"}]}"#).unwrap();
        assert_eq!(menu.items().len(), 1);
    }

    #[test]
    fn empty_menu_items_still_shadow_dishes() {
        let menu: MenuEntry =
            serde_json::from_str(r#"{"name":"M","menu_items":[],"dishes":[{"name":"B"}]}"#)
                .unwrap();
        assert!(menu.items().is_empty());
    }

    #[test]
    fn absent_restaurants_parses_to_empty() {
        let doc: MenuDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.restaurants.is_empty());
    }

    #[test]
    fn price_coercion() {
        assert_eq!(PriceValue::Number(12.99).as_decimal(), Some(12.99));
        assert_eq!(PriceValue::Text("4.99".to_string()).as_decimal(), Some(4.99));
        assert_eq!(PriceValue::Text(" 7.5 ".to_string()).as_decimal(), Some(7.5));
        assert_eq!(PriceValue::Text("1,299.00".to_string()).as_decimal(), None);
        assert_eq!(PriceValue::Text("abc".to_string()).as_decimal(), None);
        assert_eq!(PriceValue::Other(serde_json::Value::Bool(true)).as_decimal(), None);
    }

    #[test]
    fn non_numeric_price_does_not_abort_document_parse() {
        let doc: MenuDocument = serde_json::from_str(
            r#"{"restaurants":[{"name":"R","menus":[{"name":"M","menu_items":[{"name":"X","price":true}]}]}]}"#,
        )
        .unwrap();
        let item = &doc.restaurants[0].menus[0].items()[0];
        assert!(item.price.as_ref().unwrap().as_decimal().is_none());
    }
}
