use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dine_core::{TableGroupId, TableId};
use dine_table::GroupedTables;

use crate::{error::{AppError, AppJson}, state::AppState, tables::TableResponse};

#[derive(Debug, Deserialize)]
pub struct CreateTableGroupRequest {
    pub order_table_ids: Vec<TableId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TableGroupResponse {
    pub id: TableGroupId,
    pub created_at: DateTime<Utc>,
    pub order_tables: Vec<TableResponse>,
}

impl From<GroupedTables> for TableGroupResponse {
    fn from(grouped: GroupedTables) -> Self {
        Self {
            id: grouped.group.id,
            created_at: grouped.group.created_at,
            order_tables: grouped.order_tables.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/table-groups", post(create_table_group))
        .route("/api/table-groups/{id}", delete(ungroup))
}

/// POST /api/table-groups
/// Merge empty tables into one group
async fn create_table_group(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateTableGroupRequest>,
) -> Result<(StatusCode, Json<TableGroupResponse>), AppError> {
    let mut tx = state.store.begin().await?;
    let grouped = state.table_groups.create(&mut *tx, req.order_table_ids).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(grouped.into())))
}

/// DELETE /api/table-groups/:id
/// Dissolve a group once all its orders are completed
async fn ungroup(
    State(state): State<AppState>,
    Path(group_id): Path<TableGroupId>,
) -> Result<StatusCode, AppError> {
    let mut tx = state.store.begin().await?;
    state.table_groups.ungroup(&mut *tx, group_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
