use dine_core::order::OrderStatus;
use dine_core::repository::{OrderRepository, TableRepository};
use dine_core::table::{NewOrderTable, OrderTable};
use dine_core::{CoreError, CoreResult, TableId};
use tracing::{info, warn};

/// Provisioning and seating of individual tables
#[derive(Debug, Default, Clone, Copy)]
pub struct TableService;

impl TableService {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<U>(&self, tx: &mut U, number_of_guests: i32, empty: bool) -> CoreResult<OrderTable>
    where
        U: TableRepository + ?Sized,
    {
        let table = tx.create_table(NewOrderTable::new(number_of_guests, empty)?).await?;
        info!("Order table {} provisioned", table.id);
        Ok(table)
    }

    pub async fn list<U>(&self, tx: &mut U) -> CoreResult<Vec<OrderTable>>
    where
        U: TableRepository + ?Sized,
    {
        tx.list_tables().await
    }

    /// Mark a table free or occupied. Grouped tables and tables with open
    /// orders keep their state.
    pub async fn change_empty<U>(&self, tx: &mut U, table_id: TableId, empty: bool) -> CoreResult<OrderTable>
    where
        U: TableRepository + OrderRepository + ?Sized,
    {
        let mut table = load(tx, table_id).await?;

        if tx
            .exists_by_table_ids_and_status_in(&[table_id], &OrderStatus::UNFINISHED)
            .await?
        {
            warn!("Refusing to change occupancy of table {}: orders still open", table_id);
            return Err(CoreError::validation(format!(
                "table {} has unfinished orders",
                table_id
            )));
        }

        table.change_empty(empty)?;
        tx.update_table(&table).await
    }

    pub async fn change_number_of_guests<U>(
        &self,
        tx: &mut U,
        table_id: TableId,
        number_of_guests: i32,
    ) -> CoreResult<OrderTable>
    where
        U: TableRepository + ?Sized,
    {
        if number_of_guests < 0 {
            return Err(CoreError::validation(format!(
                "number of guests must not be negative, got {}",
                number_of_guests
            )));
        }

        let mut table = load(tx, table_id).await?;
        table.change_number_of_guests(number_of_guests)?;
        tx.update_table(&table).await
    }
}

async fn load<U>(tx: &mut U, table_id: TableId) -> CoreResult<OrderTable>
where
    U: TableRepository + ?Sized,
{
    tx.get_table(table_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("order table {}", table_id)))
}
