use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use dine_core::table::OrderTable;
use dine_core::{TableGroupId, TableId};

use crate::{error::{AppError, AppJson}, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub number_of_guests: i32,
    pub empty: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangeEmptyRequest {
    pub empty: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChangeNumberOfGuestsRequest {
    pub number_of_guests: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableResponse {
    pub id: TableId,
    pub table_group_id: Option<TableGroupId>,
    pub number_of_guests: i32,
    pub empty: bool,
}

impl From<OrderTable> for TableResponse {
    fn from(table: OrderTable) -> Self {
        Self {
            id: table.id,
            table_group_id: table.table_group_id,
            number_of_guests: table.number_of_guests,
            empty: table.empty,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tables", get(list_tables).post(create_table))
        .route("/api/tables/{id}/empty", put(change_empty))
        .route("/api/tables/{id}/number-of-guests", put(change_number_of_guests))
}

/// POST /api/tables
async fn create_table(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateTableRequest>,
) -> Result<(StatusCode, Json<TableResponse>), AppError> {
    let mut tx = state.store.begin().await?;
    let table = state.tables.create(&mut *tx, req.number_of_guests, req.empty).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(table.into())))
}

/// GET /api/tables
async fn list_tables(State(state): State<AppState>) -> Result<Json<Vec<TableResponse>>, AppError> {
    let mut tx = state.store.begin().await?;
    let tables = state.tables.list(&mut *tx).await?;

    Ok(Json(tables.into_iter().map(Into::into).collect()))
}

/// PUT /api/tables/:id/empty
async fn change_empty(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    AppJson(req): AppJson<ChangeEmptyRequest>,
) -> Result<Json<TableResponse>, AppError> {
    let mut tx = state.store.begin().await?;
    let table = state.tables.change_empty(&mut *tx, table_id, req.empty).await?;
    tx.commit().await?;

    Ok(Json(table.into()))
}

/// PUT /api/tables/:id/number-of-guests
async fn change_number_of_guests(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    AppJson(req): AppJson<ChangeNumberOfGuestsRequest>,
) -> Result<Json<TableResponse>, AppError> {
    let mut tx = state.store.begin().await?;
    let table = state
        .tables
        .change_number_of_guests(&mut *tx, table_id, req.number_of_guests)
        .await?;
    tx.commit().await?;

    Ok(Json(table.into()))
}
