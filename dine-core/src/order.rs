use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, OrderId, ProductId, TableId};

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Cooking,
    Meal,
    Completion,
}

impl OrderStatus {
    /// Statuses that still keep a table busy.
    pub const UNFINISHED: [OrderStatus; 2] = [OrderStatus::Cooking, OrderStatus::Meal];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Cooking => "COOKING",
            OrderStatus::Meal => "MEAL",
            OrderStatus::Completion => "COMPLETION",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Completion)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COOKING" => Ok(OrderStatus::Cooking),
            "MEAL" => Ok(OrderStatus::Meal),
            "COMPLETION" => Ok(OrderStatus::Completion),
            other => Err(CoreError::validation(format!("unknown order status {}", other))),
        }
    }
}

/// One product line on an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl OrderLineItem {
    pub fn new(product_id: ProductId, quantity: i64) -> CoreResult<Self> {
        if quantity <= 0 {
            return Err(CoreError::validation(format!(
                "quantity for product {} must be positive, got {}",
                product_id, quantity
            )));
        }
        Ok(Self { product_id, quantity })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_table_id: TableId,
    pub status: OrderStatus,
    pub ordered_time: DateTime<Utc>,
    pub line_items: Vec<OrderLineItem>,
}

impl Order {
    pub fn ensure_not_completed(&self) -> CoreResult<()> {
        if self.status.is_completed() {
            return Err(CoreError::validation(format!(
                "order {} is already completed",
                self.id
            )));
        }
        Ok(())
    }

    /// Overwrite the status. Completion is the only lock; any other current
    /// status accepts any target, including going back to COOKING.
    pub fn change_status(&mut self, new_status: OrderStatus) -> CoreResult<()> {
        self.ensure_not_completed()?;
        self.status = new_status;
        Ok(())
    }
}

/// Order accepted from the floor but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_table_id: TableId,
    pub status: OrderStatus,
    pub ordered_time: DateTime<Utc>,
    pub line_items: Vec<OrderLineItem>,
}

impl NewOrder {
    pub fn new(
        order_table_id: TableId,
        line_items: Vec<OrderLineItem>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if line_items.is_empty() {
            return Err(CoreError::validation("an order needs at least one line item"));
        }
        let mut order = Self {
            order_table_id,
            status: OrderStatus::Cooking,
            ordered_time: now,
            line_items,
        };
        order.start_cooking(now);
        Ok(order)
    }

    /// Send the order to the kitchen. The only place ordered_time is set.
    pub fn start_cooking(&mut self, now: DateTime<Utc>) {
        self.status = OrderStatus::Cooking;
        self.ordered_time = now;
    }
}
