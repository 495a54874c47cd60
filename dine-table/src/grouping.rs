use std::collections::HashMap;
use std::sync::Arc;

use dine_core::order::OrderStatus;
use dine_core::repository::{OrderRepository, TableGroupRepository, TableRepository};
use dine_core::table::{NewTableGroup, OrderTable, TableGroup};
use dine_core::{Clock, CoreError, CoreResult, TableGroupId, TableId};
use tracing::{info, warn};

/// A freshly created group together with its member tables, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedTables {
    pub group: TableGroup,
    pub order_tables: Vec<OrderTable>,
}

/// Merges tables into groups and dissolves them again.
///
/// Every call works inside the unit of work handed in by the caller; the
/// caller commits only when the call succeeds, so a rejected request leaves
/// tables and groups exactly as they were.
pub struct TableGroupService {
    clock: Arc<dyn Clock>,
}

impl TableGroupService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Group two or more empty, ungrouped tables.
    pub async fn create<U>(&self, tx: &mut U, order_table_ids: Vec<TableId>) -> CoreResult<GroupedTables>
    where
        U: TableRepository + TableGroupRepository + ?Sized,
    {
        let new_group = NewTableGroup::new(order_table_ids, self.clock.now())?;

        let tables = tx.list_tables_by_ids(&new_group.order_table_ids).await?;
        if tables.len() != new_group.order_table_ids.len() {
            let missing: Vec<String> = new_group
                .order_table_ids
                .iter()
                .filter(|id| !tables.iter().any(|t| t.id == **id))
                .map(|id| id.to_string())
                .collect();
            warn!("Rejected table group: unknown tables [{}]", missing.join(", "));
            return Err(CoreError::validation(format!(
                "unknown order tables: {}",
                missing.join(", ")
            )));
        }

        for table in &tables {
            if let Err(e) = table.ensure_groupable() {
                warn!("Rejected table group: {}", e);
                return Err(e);
            }
        }

        let group = tx.create_table_group(new_group).await?;

        let mut by_id: HashMap<TableId, OrderTable> =
            tables.into_iter().map(|t| (t.id, t)).collect();
        let mut order_tables = Vec::with_capacity(group.order_table_ids.len());
        for table_id in &group.order_table_ids {
            let mut table = by_id.remove(table_id).ok_or_else(|| {
                CoreError::InternalError(format!("order table {} vanished while grouping", table_id))
            })?;
            table.assign_group(group.id);
            order_tables.push(tx.update_table(&table).await?);
        }

        info!("Table group {} created with {} tables", group.id, order_tables.len());
        Ok(GroupedTables { group, order_tables })
    }

    /// Dissolve a group once every order on its tables is completed.
    pub async fn ungroup<U>(&self, tx: &mut U, group_id: TableGroupId) -> CoreResult<()>
    where
        U: TableRepository + OrderRepository + ?Sized,
    {
        let tables = tx.list_tables_by_group(group_id).await?;
        if tables.is_empty() {
            return Err(CoreError::not_found(format!("table group {}", group_id)));
        }

        // Check all members before touching any of them.
        let table_ids: Vec<TableId> = tables.iter().map(|t| t.id).collect();
        if tx
            .exists_by_table_ids_and_status_in(&table_ids, &OrderStatus::UNFINISHED)
            .await?
        {
            warn!("Refusing to ungroup table group {}: orders still open", group_id);
            return Err(CoreError::validation(format!(
                "cannot ungroup table group {} while orders are unfinished",
                group_id
            )));
        }

        for mut table in tables {
            table.release_group();
            tx.update_table(&table).await?;
        }

        info!("Table group {} dissolved", group_id);
        Ok(())
    }
}
