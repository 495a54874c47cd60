use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dine_core::order::{Order, OrderLineItem, OrderStatus};
use dine_core::{CoreResult, OrderId, ProductId, TableId};

use crate::{error::{AppError, AppJson}, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_table_id: TableId,
    pub order_line_items: Vec<OrderLineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineItemRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChangeOrderStatusRequest {
    pub order_status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub order_table_id: TableId,
    pub order_status: OrderStatus,
    pub ordered_time: DateTime<Utc>,
    pub order_line_items: Vec<OrderLineItemResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderLineItemResponse {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_table_id: order.order_table_id,
            order_status: order.status,
            ordered_time: order.ordered_time,
            order_line_items: order
                .line_items
                .into_iter()
                .map(|item| OrderLineItemResponse {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}/order-status", put(change_order_status))
}

/// POST /api/orders
async fn create_order(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let line_items = req
        .order_line_items
        .into_iter()
        .map(|item| OrderLineItem::new(item.product_id, item.quantity))
        .collect::<CoreResult<Vec<_>>>()?;

    let mut tx = state.store.begin().await?;
    let order = state.orders.create_order(&mut *tx, req.order_table_id, line_items).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /api/orders
async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let mut tx = state.store.begin().await?;
    let orders = state.orders.list_orders(&mut *tx).await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// PUT /api/orders/:id/order-status
async fn change_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    AppJson(req): AppJson<ChangeOrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let mut tx = state.store.begin().await?;
    let order = state.orders.change_status(&mut *tx, order_id, req.order_status).await?;
    tx.commit().await?;

    Ok(Json(order.into()))
}
