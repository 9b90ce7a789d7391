//! Menu catalog: static item data and fuzzy name lookup
//!
//! The catalog is immutable after load. Items are held behind `Arc` so order
//! lines and kiosk listings reference them without copying; the catalog
//! itself is shared and never mutated during a session.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Menu category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Coffee,
    ColdDrinks,
    Pastries,
    Sandwiches,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Self; 4] = [
        Self::Coffee,
        Self::ColdDrinks,
        Self::Pastries,
        Self::Sandwiches,
    ];

    /// Human-readable label (e.g. "Cold Drinks")
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Coffee => "Coffee",
            Self::ColdDrinks => "Cold Drinks",
            Self::Pastries => "Pastries",
            Self::Sandwiches => "Sandwiches",
        }
    }

    /// Wire name used in schemas and config files (e.g. `cold_drinks`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coffee => "coffee",
            Self::ColdDrinks => "cold_drinks",
            Self::Pastries => "pastries",
            Self::Sandwiches => "sandwiches",
        }
    }

    /// Parse a category from user text, tolerating spaces ("cold drinks")
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase().replace(' ', "_");
        Self::ALL.into_iter().find(|c| c.as_str() == normalized)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    /// Unique item identifier (e.g. "lat001")
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description shown on the kiosk
    pub description: String,

    /// Price in dollars; never negative
    pub price: f64,

    /// Menu category
    pub category: Category,

    /// Whether the item can currently be ordered
    #[serde(default = "default_available")]
    pub available: bool,

    /// Preparation time estimate in minutes
    #[serde(default = "default_prep_minutes")]
    pub prep_minutes: u32,

    /// Valid customization tags for this item
    #[serde(default)]
    pub customizations: Vec<String>,
}

const fn default_available() -> bool {
    true
}

const fn default_prep_minutes() -> u32 {
    5
}

/// TOML menu file shape: `[[item]]` tables
#[derive(Debug, Deserialize)]
struct MenuFile {
    item: Vec<MenuItem>,
}

/// Immutable menu catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Arc<MenuItem>>,
}

impl Catalog {
    /// Build a catalog from a list of items
    ///
    /// # Errors
    ///
    /// Returns a validation error if any item has a negative price or a
    /// duplicate id.
    pub fn new(items: Vec<MenuItem>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for item in &items {
            if item.price < 0.0 {
                return Err(Error::Validation(format!(
                    "negative price for menu item {}",
                    item.id
                )));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate menu item id: {}",
                    item.id
                )));
            }
        }
        Ok(Self {
            items: items.into_iter().map(Arc::new).collect(),
        })
    }

    /// Load a catalog from a TOML menu file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// parsed items fail validation.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: MenuFile = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), items = file.item.len(), "loaded menu file");
        Self::new(file.item)
    }

    /// Find a menu item by fuzzy name match
    ///
    /// Matching is case-insensitive substring in both directions: the query
    /// may contain the item name ("cafe latte" matches "Latte") or the item
    /// name may contain the query ("latte" matches "Latte"). The first match
    /// in catalog order wins; overlapping names ("Latte" vs "Caffe Latte")
    /// are not disambiguated.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` listing a few available items if nothing matches.
    pub fn lookup_by_name(&self, query: &str) -> Result<Arc<MenuItem>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::NotFound("empty item name".to_string()));
        }

        self.items
            .iter()
            .find(|item| {
                let name = item.name.to_lowercase();
                name.contains(&needle) || needle.contains(&name)
            })
            .cloned()
            .ok_or_else(|| {
                let available: Vec<&str> = self
                    .items
                    .iter()
                    .filter(|i| i.available)
                    .take(5)
                    .map(|i| i.name.as_str())
                    .collect();
                Error::NotFound(format!(
                    "couldn't find '{query}' on the menu; available items include: {}",
                    available.join(", ")
                ))
            })
    }

    /// List available items, optionally filtered to one category
    ///
    /// Unavailable items are always excluded. Iteration order is catalog
    /// (menu display) order.
    #[must_use]
    pub fn list_by_category(&self, category: Option<Category>) -> Vec<Arc<MenuItem>> {
        self.items
            .iter()
            .filter(|item| item.available)
            .filter(|item| category.is_none_or(|c| item.category == c))
            .cloned()
            .collect()
    }

    /// Look up an item by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<MenuItem>> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    /// Suggest items for a stated preference
    ///
    /// Keyword buckets, not a recommender: "coffee"/"caffeine", "cold"/
    /// "iced", "sweet"/"dessert", "healthy"/"light", "filling"/"hungry".
    /// Anything else gets the popular picks. At most three suggestions.
    #[must_use]
    pub fn recommend(&self, preference: &str) -> Vec<Arc<MenuItem>> {
        let pref = preference.to_lowercase();
        let ids: &[&str] = if pref.contains("coffee") || pref.contains("caffeine") {
            &["lat001", "cap001", "ame001"]
        } else if pref.contains("cold") || pref.contains("iced") {
            &["ice001", "fra001", "smo001"]
        } else if pref.contains("sweet") || pref.contains("dessert") {
            &["fra001", "dan001", "muf001"]
        } else if pref.contains("healthy") || pref.contains("light") {
            &["smo001", "veg001"]
        } else if pref.contains("filling") || pref.contains("hungry") {
            &["san001", "veg001", "bag001"]
        } else {
            &["lat001", "cap001", "san001", "muf001"]
        };

        ids.iter().take(3).filter_map(|id| self.get(id)).collect()
    }

    /// Number of items in the catalog (including unavailable ones)
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Catalog {
    /// The built-in cafe menu
    fn default() -> Self {
        let item = |id: &str,
                    name: &str,
                    description: &str,
                    price: f64,
                    category: Category,
                    prep_minutes: u32,
                    customizations: &[&str]| MenuItem {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            category,
            available: true,
            prep_minutes,
            customizations: customizations.iter().map(ToString::to_string).collect(),
        };

        let items = vec![
            item(
                "esp001",
                "Espresso",
                "Rich and bold espresso shot",
                3.50,
                Category::Coffee,
                3,
                &["extra_shot", "decaf"],
            ),
            item(
                "cap001",
                "Cappuccino",
                "Espresso with steamed milk foam",
                4.50,
                Category::Coffee,
                5,
                &["extra_shot", "decaf", "oat_milk", "almond_milk", "soy_milk"],
            ),
            item(
                "lat001",
                "Latte",
                "Smooth espresso with steamed milk",
                4.75,
                Category::Coffee,
                5,
                &[
                    "extra_shot",
                    "decaf",
                    "vanilla",
                    "caramel",
                    "oat_milk",
                    "almond_milk",
                ],
            ),
            item(
                "ame001",
                "Americano",
                "Espresso with hot water",
                3.75,
                Category::Coffee,
                3,
                &["extra_shot", "decaf"],
            ),
            item(
                "mac001",
                "Macchiato",
                "Espresso marked with milk foam",
                4.25,
                Category::Coffee,
                4,
                &["extra_shot", "decaf", "caramel"],
            ),
            item(
                "ice001",
                "Iced Coffee",
                "Cold brew coffee over ice",
                4.00,
                Category::ColdDrinks,
                3,
                &["extra_shot", "vanilla", "caramel", "oat_milk"],
            ),
            item(
                "fra001",
                "Frappuccino",
                "Blended ice coffee drink",
                5.50,
                Category::ColdDrinks,
                6,
                &["extra_shot", "vanilla", "caramel", "chocolate"],
            ),
            item(
                "smo001",
                "Smoothie",
                "Fresh fruit smoothie",
                6.00,
                Category::ColdDrinks,
                5,
                &["protein_powder", "extra_fruit"],
            ),
            item(
                "cro001",
                "Croissant",
                "Buttery, flaky pastry",
                3.25,
                Category::Pastries,
                2,
                &[],
            ),
            item(
                "muf001",
                "Blueberry Muffin",
                "Fresh blueberry muffin",
                2.75,
                Category::Pastries,
                2,
                &[],
            ),
            item(
                "dan001",
                "Danish",
                "Sweet pastry with fruit filling",
                3.00,
                Category::Pastries,
                2,
                &[],
            ),
            item(
                "bag001",
                "Bagel",
                "Fresh bagel with cream cheese",
                4.00,
                Category::Pastries,
                4,
                &["everything", "sesame", "plain"],
            ),
            item(
                "san001",
                "Club Sandwich",
                "Turkey, bacon, lettuce, tomato",
                8.50,
                Category::Sandwiches,
                10,
                &[],
            ),
            item(
                "gri001",
                "Grilled Cheese",
                "Melted cheese on sourdough",
                6.00,
                Category::Sandwiches,
                8,
                &[],
            ),
            item(
                "veg001",
                "Veggie Wrap",
                "Fresh vegetables in tortilla wrap",
                7.25,
                Category::Sandwiches,
                7,
                &[],
            ),
        ];

        // Built-in menu is known-valid
        Self {
            items: items.into_iter().map(Arc::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_exact_and_substring() {
        let catalog = Catalog::default();

        assert_eq!(catalog.lookup_by_name("Latte").unwrap().id, "lat001");
        assert_eq!(catalog.lookup_by_name("latte").unwrap().id, "lat001");
        // Query containing the item name also matches
        assert_eq!(catalog.lookup_by_name("cafe latte").unwrap().id, "lat001");
        assert_eq!(
            catalog.lookup_by_name("blueberry muffin").unwrap().id,
            "muf001"
        );
    }

    #[test]
    fn lookup_first_match_wins() {
        // "co" is a substring of both Iced Coffee and Croissant; catalog order
        // decides the winner.
        let catalog = Catalog::default();
        let hit = catalog.lookup_by_name("co").unwrap();
        assert_eq!(hit.id, "ice001");
    }

    #[test]
    fn lookup_miss_lists_alternatives() {
        let catalog = Catalog::default();
        let err = catalog.lookup_by_name("xyz-nonexistent").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("xyz-nonexistent"));
        assert!(msg.contains("Espresso"));
    }

    #[test]
    fn list_filters_unavailable() {
        let items = vec![
            MenuItem {
                id: "a".into(),
                name: "A".into(),
                description: String::new(),
                price: 1.0,
                category: Category::Coffee,
                available: true,
                prep_minutes: 1,
                customizations: vec![],
            },
            MenuItem {
                id: "b".into(),
                name: "B".into(),
                description: String::new(),
                price: 1.0,
                category: Category::Coffee,
                available: false,
                prep_minutes: 1,
                customizations: vec![],
            },
        ];
        let catalog = Catalog::new(items).unwrap();

        let listed = catalog.list_by_category(Some(Category::Coffee));
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a");
    }

    #[test]
    fn list_all_categories() {
        let catalog = Catalog::default();
        assert_eq!(catalog.list_by_category(None).len(), 15);
        assert_eq!(catalog.list_by_category(Some(Category::Pastries)).len(), 4);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let items = vec![
            MenuItem {
                id: "dup".into(),
                name: "One".into(),
                description: String::new(),
                price: 1.0,
                category: Category::Coffee,
                available: true,
                prep_minutes: 1,
                customizations: vec![],
            },
            MenuItem {
                id: "dup".into(),
                name: "Two".into(),
                description: String::new(),
                price: 1.0,
                category: Category::Coffee,
                available: true,
                prep_minutes: 1,
                customizations: vec![],
            },
        ];
        assert!(Catalog::new(items).is_err());
    }

    #[test]
    fn recommend_by_preference() {
        let catalog = Catalog::default();

        let cold: Vec<String> = catalog
            .recommend("something cold please")
            .iter()
            .map(|i| i.id.clone())
            .collect();
        assert_eq!(cold, ["ice001", "fra001", "smo001"]);

        // Unrecognized preference falls back to popular picks, capped at 3
        assert_eq!(catalog.recommend("whatever").len(), 3);
    }

    #[test]
    fn category_parse_tolerates_spaces() {
        assert_eq!(Category::parse("cold drinks"), Some(Category::ColdDrinks));
        assert_eq!(Category::parse("COFFEE"), Some(Category::Coffee));
        assert_eq!(Category::parse("sushi"), None);
    }
}
