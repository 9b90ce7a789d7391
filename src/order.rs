//! Order cart: the single in-progress order and its lifecycle
//!
//! At most one order is mutable at a time. Paid orders move to an append-only
//! history; cancelled orders are discarded. The running total is recomputed
//! from the lines after every mutation so it can never drift.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, MenuItem};
use crate::{Error, Result};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Wire/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Wire/display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Accepted payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    Mobile,
}

impl PaymentMethod {
    /// Parse from user text
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "card" | "credit" | "debit" => Some(Self::Card),
            "cash" => Some(Self::Cash),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }

    /// Display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
            Self::Mobile => "mobile",
        }
    }
}

/// One line of an order: an item reference plus quantity and options
#[derive(Debug, Clone)]
pub struct OrderLine {
    /// Catalog item this line refers to
    pub item: Arc<MenuItem>,

    /// Quantity; always at least 1 (a line at zero is removed)
    pub quantity: u32,

    /// Chosen customizations; subset of the item's valid set
    pub customizations: Vec<String>,

    /// Free-text note
    pub note: String,
}

impl OrderLine {
    /// Line total: unit price times quantity
    #[must_use]
    pub fn total(&self) -> f64 {
        self.item.price * f64::from(self.quantity)
    }
}

/// A customer order
#[derive(Debug, Clone)]
pub struct Order {
    /// Sequential process-unique id, e.g. "ORD0001"
    pub id: String,

    /// Customer name; defaulted when not supplied
    pub customer_name: String,

    /// Lines in insertion order
    pub lines: Vec<OrderLine>,

    /// Lifecycle status
    pub status: OrderStatus,

    /// Payment status
    pub payment_status: PaymentStatus,

    /// Running total; always equals the sum of line totals
    pub total: f64,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Set at confirmation: now + max prep time across lines
    pub estimated_ready_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total item count across all lines
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Re-derive the running total from the lines
    fn recompute_total(&mut self) {
        self.total = self.lines.iter().map(OrderLine::total).sum();
    }

    /// Multi-line order summary for narration and the kiosk cart view
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("Order #{} for {}\n", self.id, self.customer_name);
        for (i, line) in self.lines.iter().enumerate() {
            out.push_str(&format!(
                "{}. {}x {} - ${:.2}\n",
                i + 1,
                line.quantity,
                line.item.name,
                line.total()
            ));
            if !line.customizations.is_empty() {
                out.push_str(&format!(
                    "   Customizations: {}\n",
                    line.customizations.join(", ")
                ));
            }
            if !line.note.is_empty() {
                out.push_str(&format!("   Notes: {}\n", line.note));
            }
        }
        out.push_str(&format!("Total items: {}\n", self.item_count()));
        out.push_str(&format!("Total: ${:.2}\n", self.total));
        out.push_str(&format!("Status: {}", self.status.as_str()));
        out
    }
}

/// Outcome of removing an item from the order
#[derive(Debug, Clone)]
pub struct RemovedItem {
    /// Display name of the affected item
    pub item_name: String,

    /// True if the whole line was removed, false if only decremented
    pub removed_line: bool,

    /// Quantity left on the line (0 when the line was removed)
    pub remaining_quantity: u32,
}

/// The order cart service
///
/// Owns the current order and the history of completed orders. Constructed
/// per session and shared behind `Arc<Mutex<_>>`; never a global.
pub struct OrderCart {
    catalog: Arc<Catalog>,
    current: Option<Order>,
    history: Vec<Order>,
    next_order_number: u32,
    payment_delay: Duration,
}

impl OrderCart {
    /// Create a new cart over a catalog
    ///
    /// `payment_delay` is the simulated payment-processing time; tests pass
    /// zero.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, payment_delay: Duration) -> Self {
        Self {
            catalog,
            current: None,
            history: Vec::new(),
            next_order_number: 1,
            payment_delay,
        }
    }

    /// The current (mutable) order, if any
    #[must_use]
    pub fn current_order(&self) -> Option<&Order> {
        self.current.as_ref()
    }

    /// Completed orders, oldest first
    #[must_use]
    pub fn history(&self) -> &[Order] {
        &self.history
    }

    /// Find an order in history by id
    #[must_use]
    pub fn find_order(&self, order_id: &str) -> Option<&Order> {
        self.history.iter().find(|o| o.id == order_id)
    }

    /// Start a new order
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a pending order is already active; the
    /// caller must confirm or cancel it first, never silently start over.
    pub fn start_order(&mut self, customer_name: Option<&str>) -> Result<&Order> {
        if let Some(order) = &self.current {
            if order.status == OrderStatus::Pending {
                return Err(Error::InvalidState(format!(
                    "order {} is already active; confirm or cancel it before starting a new one",
                    order.id
                )));
            }
        }

        let customer_name = match customer_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("Customer {}", self.next_order_number),
        };

        let order = Order {
            id: format!("ORD{:04}", self.next_order_number),
            customer_name,
            lines: Vec::new(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            total: 0.0,
            created_at: Utc::now(),
            estimated_ready_at: None,
        };
        self.next_order_number += 1;

        tracing::info!(order_id = %order.id, customer = %order.customer_name, "started order");
        Ok(self.current.insert(order))
    }

    /// Add an item to the current order, starting one if none is active
    ///
    /// Every add appends a new line; identical lines are not merged.
    ///
    /// # Errors
    ///
    /// `NotFound` if no menu item matches, `InvalidState` if the item is
    /// unavailable, `Validation` if the quantity is zero or a customization
    /// is not valid for the item (the message lists both the invalid and the
    /// valid ones).
    pub fn add_item(
        &mut self,
        name: &str,
        quantity: u32,
        customizations: Vec<String>,
        note: String,
    ) -> Result<&OrderLine> {
        if quantity == 0 {
            return Err(Error::Validation("quantity must be at least 1".to_string()));
        }

        let item = self.catalog.lookup_by_name(name)?;

        if !item.available {
            return Err(Error::InvalidState(format!(
                "{} is currently unavailable",
                item.name
            )));
        }

        let invalid: Vec<&String> = customizations
            .iter()
            .filter(|c| !item.customizations.contains(c))
            .collect();
        if !invalid.is_empty() {
            let invalid: Vec<&str> = invalid.iter().map(|s| s.as_str()).collect();
            let valid = if item.customizations.is_empty() {
                "none".to_string()
            } else {
                item.customizations.join(", ")
            };
            return Err(Error::Validation(format!(
                "invalid customizations for {}: {}; valid: {}",
                item.name,
                invalid.join(", "),
                valid
            )));
        }

        if self.current.is_none() {
            self.start_order(None)?;
        }
        // Current order exists from here on
        let order = self.current.as_mut().ok_or_else(no_active_order)?;

        order.lines.push(OrderLine {
            item,
            quantity,
            customizations,
            note,
        });
        order.recompute_total();

        tracing::debug!(
            order_id = %order.id,
            quantity,
            total = order.total,
            "added line to order"
        );
        order
            .lines
            .last()
            .ok_or_else(|| Error::InvalidState("order line missing after add".to_string()))
    }

    /// Remove an item (or part of its quantity) from the current order
    ///
    /// The first line whose item name matches the fuzzy substring policy is
    /// affected. Removing at least the line's quantity removes the whole
    /// line; otherwise the quantity is decremented.
    ///
    /// # Errors
    ///
    /// `InvalidState` if no order is active or it is empty, `NotFound` if no
    /// line matches.
    pub fn remove_item(&mut self, name: &str, quantity: u32) -> Result<RemovedItem> {
        let order = self
            .current
            .as_mut()
            .filter(|o| !o.lines.is_empty())
            .ok_or_else(|| Error::InvalidState("no active order or order is empty".to_string()))?;

        let needle = name.trim().to_lowercase();
        let pos = order
            .lines
            .iter()
            .position(|line| {
                let item_name = line.item.name.to_lowercase();
                item_name.contains(&needle) || needle.contains(&item_name)
            })
            .ok_or_else(|| Error::NotFound(format!("item '{name}' not in the current order")))?;

        let outcome = if order.lines[pos].quantity <= quantity {
            let removed = order.lines.remove(pos);
            RemovedItem {
                item_name: removed.item.name.clone(),
                removed_line: true,
                remaining_quantity: 0,
            }
        } else {
            let line = &mut order.lines[pos];
            line.quantity -= quantity;
            RemovedItem {
                item_name: line.item.name.clone(),
                removed_line: false,
                remaining_quantity: line.quantity,
            }
        };
        order.recompute_total();

        tracing::debug!(
            order_id = %order.id,
            item = %outcome.item_name,
            total = order.total,
            "removed from order"
        );
        Ok(outcome)
    }

    /// Modify an existing line's customizations and/or note in place
    ///
    /// # Errors
    ///
    /// `InvalidState` if no order is active, `NotFound` if no line matches,
    /// `Validation` if a new customization is not valid for the item.
    pub fn modify_line(
        &mut self,
        name: &str,
        new_customizations: Option<Vec<String>>,
        new_note: Option<String>,
    ) -> Result<&OrderLine> {
        let order = self
            .current
            .as_mut()
            .filter(|o| !o.lines.is_empty())
            .ok_or_else(|| Error::InvalidState("no active order to modify".to_string()))?;

        let needle = name.trim().to_lowercase();
        let line = order
            .lines
            .iter_mut()
            .find(|line| line.item.name.to_lowercase().contains(&needle))
            .ok_or_else(|| Error::NotFound(format!("item '{name}' not in the current order")))?;

        if let Some(customizations) = new_customizations {
            let invalid: Vec<&str> = customizations
                .iter()
                .filter(|c| !line.item.customizations.contains(c))
                .map(|s| s.as_str())
                .collect();
            if !invalid.is_empty() {
                return Err(Error::Validation(format!(
                    "invalid customizations for {}: {}",
                    line.item.name,
                    invalid.join(", ")
                )));
            }
            line.customizations = customizations;
        }

        if let Some(note) = new_note {
            line.note = note;
        }

        Ok(line)
    }

    /// Confirm the current order and compute its estimated ready time
    ///
    /// # Errors
    ///
    /// `InvalidState` if no order is active or it has no lines.
    pub fn confirm(&mut self) -> Result<&Order> {
        let order = self
            .current
            .as_mut()
            .filter(|o| !o.lines.is_empty())
            .ok_or_else(|| Error::InvalidState("no items in order to confirm".to_string()))?;

        let max_prep = order
            .lines
            .iter()
            .map(|l| l.item.prep_minutes)
            .max()
            .unwrap_or(0);
        order.estimated_ready_at = Some(Utc::now() + chrono::Duration::minutes(i64::from(max_prep)));
        order.status = OrderStatus::Confirmed;

        tracing::info!(order_id = %order.id, prep_minutes = max_prep, "order confirmed");
        Ok(order)
    }

    /// Process payment for the current order
    ///
    /// The payment passes through an observable `processing` state with a
    /// simulated delay before completing. On success the order moves to
    /// history with status `preparing` and the cart is cleared; the returned
    /// order is the completed copy.
    ///
    /// # Errors
    ///
    /// `InvalidState` if there is no active order or it is already paid,
    /// `Validation` if `amount` is supplied and below the order total.
    pub async fn process_payment(
        &mut self,
        method: PaymentMethod,
        amount: Option<f64>,
    ) -> Result<Order> {
        let order = self.current.as_mut().ok_or_else(no_active_order)?;

        if order.payment_status == PaymentStatus::Completed {
            return Err(Error::InvalidState(
                "payment already completed for this order".to_string(),
            ));
        }

        if let Some(paid) = amount {
            if paid < order.total {
                return Err(Error::Validation(format!(
                    "insufficient payment: order total ${:.2}, paid ${paid:.2}",
                    order.total
                )));
            }
        }

        order.payment_status = PaymentStatus::Processing;
        tracing::info!(order_id = %order.id, method = method.as_str(), "processing payment");
        tokio::time::sleep(self.payment_delay).await;

        // The guard above makes this take always succeed
        let mut order = self.current.take().ok_or_else(no_active_order)?;
        order.payment_status = PaymentStatus::Completed;
        order.status = OrderStatus::Preparing;

        tracing::info!(order_id = %order.id, total = order.total, "payment completed");
        self.history.push(order.clone());
        Ok(order)
    }

    /// Cancel the current order
    ///
    /// Cancelled orders are discarded, not retained in history; only paid
    /// orders are kept. Returns the cancelled order's id.
    ///
    /// # Errors
    ///
    /// `InvalidState` if no order is active.
    pub fn cancel(&mut self) -> Result<String> {
        let mut order = self.current.take().ok_or_else(no_active_order)?;
        order.status = OrderStatus::Cancelled;

        tracing::info!(order_id = %order.id, "order cancelled");
        Ok(order.id)
    }
}

fn no_active_order() -> Error {
    Error::InvalidState("no active order".to_string())
}
