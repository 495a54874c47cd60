use std::collections::HashSet;
use std::sync::Arc;

use dine_core::order::{NewOrder, Order, OrderLineItem, OrderStatus};
use dine_core::repository::{OrderRepository, ProductRepository, TableRepository};
use dine_core::{Clock, CoreError, CoreResult, OrderId, ProductId, TableId};
use tracing::{info, warn};

/// Manages order intake and status transitions
pub struct OrderManager {
    clock: Arc<dyn Clock>,
}

impl OrderManager {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Take an order for a seated table and send it to the kitchen.
    pub async fn create_order<U>(
        &self,
        tx: &mut U,
        order_table_id: TableId,
        line_items: Vec<OrderLineItem>,
    ) -> CoreResult<Order>
    where
        U: TableRepository + OrderRepository + ProductRepository + ?Sized,
    {
        let new_order = NewOrder::new(order_table_id, line_items, self.clock.now())?;

        let product_ids: Vec<ProductId> = new_order
            .line_items
            .iter()
            .map(|item| item.product_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if tx.count_products(&product_ids).await? != product_ids.len() {
            return Err(CoreError::validation("order references unknown products"));
        }

        let table = tx
            .get_table(order_table_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("order table {}", order_table_id)))?;
        if table.empty {
            warn!("Rejected order for empty table {}", order_table_id);
            return Err(CoreError::validation(format!(
                "table {} is empty; seat guests before ordering",
                order_table_id
            )));
        }

        let order = tx.create_order(new_order).await?;
        info!("Order {} started cooking for table {}", order.id, order.order_table_id);
        Ok(order)
    }

    pub async fn list_orders<U>(&self, tx: &mut U) -> CoreResult<Vec<Order>>
    where
        U: OrderRepository + ?Sized,
    {
        tx.list_orders().await
    }

    /// Move an order to `new_status`. Only completed orders are locked.
    pub async fn change_status<U>(&self, tx: &mut U, order_id: OrderId, new_status: OrderStatus) -> CoreResult<Order>
    where
        U: OrderRepository + ?Sized,
    {
        let mut order = tx
            .get_order(order_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("order {}", order_id)))?;

        let previous = order.status;
        if let Err(e) = order.change_status(new_status) {
            warn!("Rejected status change of order {} to {:?}: {}", order_id, new_status, e);
            return Err(e);
        }

        tx.update_order_status(order_id, order.status).await?;
        info!("Order {} moved from {:?} to {:?}", order_id, previous, order.status);
        Ok(order)
    }
}
