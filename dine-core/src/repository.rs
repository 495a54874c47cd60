use async_trait::async_trait;

use crate::catalog::{Menu, MenuGroup, NewMenu, NewMenuGroup, NewProduct, Product};
use crate::order::{NewOrder, Order, OrderStatus};
use crate::table::{NewOrderTable, NewTableGroup, OrderTable, TableGroup};
use crate::{CoreResult, MenuGroupId, OrderId, ProductId, TableGroupId, TableId};

/// Repository trait for table data access
#[async_trait]
pub trait TableRepository: Send {
    async fn create_table(&mut self, table: NewOrderTable) -> CoreResult<OrderTable>;

    async fn get_table(&mut self, id: TableId) -> CoreResult<Option<OrderTable>>;

    async fn list_tables(&mut self) -> CoreResult<Vec<OrderTable>>;

    /// Returns only the tables that exist; callers compare counts.
    async fn list_tables_by_ids(&mut self, ids: &[TableId]) -> CoreResult<Vec<OrderTable>>;

    async fn list_tables_by_group(&mut self, group_id: TableGroupId) -> CoreResult<Vec<OrderTable>>;

    async fn update_table(&mut self, table: &OrderTable) -> CoreResult<OrderTable>;
}

/// Repository trait for table group data access
#[async_trait]
pub trait TableGroupRepository: Send {
    async fn create_table_group(&mut self, group: NewTableGroup) -> CoreResult<TableGroup>;

    async fn get_table_group(&mut self, id: TableGroupId) -> CoreResult<Option<TableGroup>>;
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderRepository: Send {
    async fn create_order(&mut self, order: NewOrder) -> CoreResult<Order>;

    async fn get_order(&mut self, id: OrderId) -> CoreResult<Option<Order>>;

    async fn list_orders(&mut self) -> CoreResult<Vec<Order>>;

    /// True when any order placed on one of `table_ids` is in one of `statuses`.
    async fn exists_by_table_ids_and_status_in(
        &mut self,
        table_ids: &[TableId],
        statuses: &[OrderStatus],
    ) -> CoreResult<bool>;

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> CoreResult<()>;
}

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send {
    async fn create_product(&mut self, product: NewProduct) -> CoreResult<Product>;

    async fn list_products(&mut self) -> CoreResult<Vec<Product>>;

    async fn count_products(&mut self, ids: &[ProductId]) -> CoreResult<usize>;
}

#[async_trait]
pub trait MenuGroupRepository: Send {
    async fn create_menu_group(&mut self, group: NewMenuGroup) -> CoreResult<MenuGroup>;

    async fn get_menu_group(&mut self, id: MenuGroupId) -> CoreResult<Option<MenuGroup>>;

    async fn list_menu_groups(&mut self) -> CoreResult<Vec<MenuGroup>>;
}

#[async_trait]
pub trait MenuRepository: Send {
    /// Persists the menu together with its product lines.
    async fn create_menu(&mut self, menu: NewMenu) -> CoreResult<Menu>;

    async fn list_menus(&mut self) -> CoreResult<Vec<Menu>>;
}

/// All repositories bound to one transaction.
///
/// Nothing is visible to other units of work until `commit`. Dropping an
/// uncommitted unit of work discards every change made through it.
#[async_trait]
pub trait UnitOfWork:
    TableRepository
    + TableGroupRepository
    + OrderRepository
    + ProductRepository
    + MenuGroupRepository
    + MenuRepository
    + Send
{
    async fn commit(self: Box<Self>) -> CoreResult<()>;
}

/// Entry point to a storage backend
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>>;
}
