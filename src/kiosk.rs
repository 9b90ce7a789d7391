//! Kiosk display state machine
//!
//! A small UI state machine over the catalog and the live order cart. Each
//! operation returns the rendered screen as plain text for the caller (the
//! remote agent narrates it; actual terminal drawing is out of scope here).
//! The highlight index is clamped to the current list, never wrapped.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::catalog::{Catalog, Category, MenuItem};
use crate::order::OrderCart;
use crate::{Error, Result};

/// Display-only tax rate shown on the cart and checkout screens
const TAX_RATE: f64 = 0.08;

/// Kiosk screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Welcome,
    Categories,
    Items,
    ItemDetail,
    Cart,
    Checkout,
    Confirmation,
}

impl Screen {
    /// Wire/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Categories => "categories",
            Self::Items => "items",
            Self::ItemDetail => "item_detail",
            Self::Cart => "cart",
            Self::Checkout => "checkout",
            Self::Confirmation => "confirmation",
        }
    }
}

/// Kiosk UI controller
///
/// Reads the live cart through the shared handle; never copies order state.
pub struct KioskUi {
    catalog: Arc<Catalog>,
    cart: Arc<Mutex<OrderCart>>,
    screen: Screen,
    highlighted: usize,
    category: Option<Category>,
}

impl KioskUi {
    /// Create a kiosk showing the welcome screen
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, cart: Arc<Mutex<OrderCart>>) -> Self {
        Self {
            catalog,
            cart,
            screen: Screen::Welcome,
            highlighted: 0,
            category: None,
        }
    }

    /// Current screen
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Current highlight index
    #[must_use]
    pub const fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Currently selected category, if any
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        self.category
    }

    /// Show the welcome screen
    pub fn show_welcome(&mut self) -> String {
        self.screen = Screen::Welcome;
        self.highlighted = 0;
        tracing::debug!(screen = self.screen.as_str(), "kiosk screen changed");
        "== ROBOT CAFE ==\nWelcome! Say 'show menu' to browse our offerings,\nor name an item to order right away.".to_string()
    }

    /// Show the category list
    pub fn show_categories(&mut self) -> String {
        self.screen = Screen::Categories;
        self.highlighted = self.highlighted.min(Category::ALL.len() - 1);
        tracing::debug!(screen = self.screen.as_str(), "kiosk screen changed");
        self.render_categories()
    }

    /// Show the items of one category
    ///
    /// # Errors
    ///
    /// `NotFound` if the category name does not parse or has no available
    /// items.
    pub fn show_items(&mut self, category_text: &str) -> Result<String> {
        let category = Category::parse(category_text)
            .ok_or_else(|| Error::NotFound(format!("unknown category: {category_text}")))?;

        let items = self.catalog.list_by_category(Some(category));
        if items.is_empty() {
            return Err(Error::NotFound(format!(
                "no items available in category: {}",
                category.label()
            )));
        }

        self.screen = Screen::Items;
        self.category = Some(category);
        self.highlighted = self.highlighted.min(items.len() - 1);
        tracing::debug!(
            screen = self.screen.as_str(),
            category = category.as_str(),
            "kiosk screen changed"
        );
        Ok(self.render_items(category, &items))
    }

    /// Move the highlight to a named item on the items screen
    ///
    /// # Errors
    ///
    /// `InvalidState` if the kiosk is not on the items screen, `NotFound` if
    /// the item is not in the current category list.
    pub fn highlight_item(&mut self, name: &str) -> Result<String> {
        let category = match (self.screen, self.category) {
            (Screen::Items, Some(category)) => category,
            _ => {
                return Err(Error::InvalidState(
                    "must be viewing menu items to highlight one".to_string(),
                ));
            }
        };

        let items = self.catalog.list_by_category(Some(category));
        let needle = name.trim().to_lowercase();
        let pos = items
            .iter()
            .position(|item| item.name.to_lowercase().contains(&needle))
            .ok_or_else(|| Error::NotFound(format!("item '{name}' not in the current menu")))?;

        self.highlighted = pos;
        Ok(self.render_items(category, &items))
    }

    /// Show the detail view for a named item
    ///
    /// # Errors
    ///
    /// `NotFound` if no menu item matches.
    pub fn show_item_detail(&mut self, name: &str) -> Result<String> {
        let item = self.catalog.lookup_by_name(name)?;
        self.screen = Screen::ItemDetail;
        self.category = Some(item.category);
        tracing::debug!(
            screen = self.screen.as_str(),
            item = %item.id,
            "kiosk screen changed"
        );
        Ok(Self::render_item_detail(&item))
    }

    /// Show the cart contents
    pub async fn show_cart(&mut self) -> String {
        self.screen = Screen::Cart;
        let cart = self.cart.lock().await;
        let rendered = match cart.current_order() {
            Some(order) if !order.lines.is_empty() => {
                let tax = order.total * TAX_RATE;
                format!(
                    "== YOUR CART ==\n{}\nTax ({:.0}%): ${tax:.2}\nTotal with tax: ${:.2}",
                    order.summary(),
                    TAX_RATE * 100.0,
                    order.total + tax
                )
            }
            _ => "== YOUR CART ==\nYour cart is empty. Browse the menu to add items!".to_string(),
        };
        drop(cart);
        self.highlighted = self.list_len().await.saturating_sub(1).min(self.highlighted);
        rendered
    }

    /// Show the checkout screen
    ///
    /// # Errors
    ///
    /// `InvalidState` if there is no active order to check out.
    pub async fn show_checkout(&mut self) -> Result<String> {
        let cart = self.cart.lock().await;
        let order = cart
            .current_order()
            .ok_or_else(|| Error::InvalidState("no order to check out".to_string()))?;

        self.screen = Screen::Checkout;
        let total = order.total * (1.0 + TAX_RATE);
        Ok(format!(
            "== CHECKOUT ==\nOrder total: ${:.2}\nTax ({:.0}%): ${:.2}\nFinal total: ${total:.2}\nPayment methods: card, cash, mobile",
            order.total,
            TAX_RATE * 100.0,
            order.total * TAX_RATE
        ))
    }

    /// Show the order-confirmation screen
    ///
    /// Terminal screen: the only way out is starting a new order, which
    /// returns the kiosk to the welcome screen.
    pub fn show_confirmation(&mut self, order_id: &str) -> String {
        self.screen = Screen::Confirmation;
        self.highlighted = 0;
        tracing::debug!(screen = self.screen.as_str(), order_id, "kiosk screen changed");
        format!(
            "== ORDER CONFIRMED ==\nOrder number: {order_id}\nPick up at the main counter.\nSay 'new order' to start again."
        )
    }

    /// Move the highlight up one entry; no-op at the top
    pub async fn navigate_up(&mut self) -> String {
        self.highlighted = self.highlighted.saturating_sub(1);
        self.rerender().await
    }

    /// Move the highlight down one entry; no-op at the bottom
    pub async fn navigate_down(&mut self) -> String {
        let len = self.list_len().await;
        if self.highlighted + 1 < len {
            self.highlighted += 1;
        }
        self.rerender().await
    }

    /// Select the highlighted entry on a list screen
    ///
    /// On the categories screen this opens the category's items; on the
    /// items screen it opens the item detail. Screens without a selectable
    /// list return a "nothing to select" message rather than an error.
    pub fn select_highlighted(&mut self) -> Result<String> {
        match self.screen {
            Screen::Categories => {
                let category = Category::ALL[self.highlighted.min(Category::ALL.len() - 1)];
                self.highlighted = 0;
                self.show_items(category.as_str())
            }
            Screen::Items => {
                let category = self
                    .category
                    .ok_or_else(|| Error::InvalidState("no category selected".to_string()))?;
                let items = self.catalog.list_by_category(Some(category));
                match items.get(self.highlighted) {
                    Some(item) => {
                        let name = item.name.clone();
                        self.show_item_detail(&name)
                    }
                    None => Ok("nothing to select".to_string()),
                }
            }
            _ => Ok("nothing to select on this screen".to_string()),
        }
    }

    /// Go back to the previous screen per the fixed back-map
    ///
    /// item_detail goes to items, items to categories, cart and checkout to
    /// categories, anything else to welcome.
    pub fn back(&mut self) -> String {
        self.highlighted = 0;
        match self.screen {
            Screen::ItemDetail => match self.category {
                Some(category) => self
                    .show_items(category.as_str())
                    .unwrap_or_else(|_| self.show_categories()),
                None => self.show_categories(),
            },
            Screen::Items | Screen::Cart | Screen::Checkout => self.show_categories(),
            Screen::Welcome | Screen::Categories | Screen::Confirmation => self.show_welcome(),
        }
    }

    /// Length of the list backing the current screen
    async fn list_len(&self) -> usize {
        match self.screen {
            Screen::Categories => Category::ALL.len(),
            Screen::Items => match self.category {
                Some(category) => self.catalog.list_by_category(Some(category)).len(),
                None => 0,
            },
            Screen::Cart => self
                .cart
                .lock()
                .await
                .current_order()
                .map_or(0, |o| o.lines.len()),
            _ => 0,
        }
    }

    /// Re-render the current screen after a highlight change
    async fn rerender(&mut self) -> String {
        match self.screen {
            Screen::Categories => self.render_categories(),
            Screen::Items => match self.category {
                Some(category) => {
                    let items = self.catalog.list_by_category(Some(category));
                    self.render_items(category, &items)
                }
                None => self.show_categories(),
            },
            Screen::Cart => self.show_cart().await,
            _ => format!("highlight at index {}", self.highlighted),
        }
    }

    fn render_categories(&self) -> String {
        let mut out = String::from("== MENU CATEGORIES ==\n");
        for (i, category) in Category::ALL.iter().enumerate() {
            let marker = if i == self.highlighted { "> " } else { "  " };
            out.push_str(&format!("{marker}{}\n", category.label()));
        }
        out.push_str("Say a category name or 'select' to choose");
        out
    }

    fn render_items(&self, category: Category, items: &[Arc<MenuItem>]) -> String {
        let mut out = format!("== {} ==\n", category.label().to_uppercase());
        for (i, item) in items.iter().enumerate() {
            let marker = if i == self.highlighted { "> " } else { "  " };
            out.push_str(&format!("{marker}{} - ${:.2}\n", item.name, item.price));
            out.push_str(&format!("    {}\n", item.description));
        }
        out.push_str("Say an item name for details or 'back' for categories");
        out
    }

    fn render_item_detail(item: &MenuItem) -> String {
        let customizations = if item.customizations.is_empty() {
            "none".to_string()
        } else {
            item.customizations.join(", ")
        };
        format!(
            "== {} ==\nPrice: ${:.2}\n{}\nPrep time: ~{} minutes\nCustomizations: {customizations}\nSay 'add to order' or 'back' for the menu",
            item.name.to_uppercase(),
            item.price,
            item.description,
            item.prep_minutes
        )
    }
}
