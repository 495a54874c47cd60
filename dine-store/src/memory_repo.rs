use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use dine_core::catalog::{Menu, MenuGroup, NewMenu, NewMenuGroup, NewProduct, Product};
use dine_core::order::{NewOrder, Order, OrderStatus};
use dine_core::repository::{
    MenuGroupRepository, MenuRepository, OrderRepository, ProductRepository, Store, TableGroupRepository,
    TableRepository, UnitOfWork,
};
use dine_core::table::{NewOrderTable, NewTableGroup, OrderTable, TableGroup};
use dine_core::{
    CoreError, CoreResult, MenuGroupId, MenuId, OrderId, ProductId, TableGroupId, TableId,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tables: BTreeMap<TableId, OrderTable>,
    table_groups: BTreeMap<TableGroupId, TableGroup>,
    orders: BTreeMap<OrderId, Order>,
    products: BTreeMap<ProductId, Product>,
    menu_groups: BTreeMap<MenuGroupId, MenuGroup>,
    menus: BTreeMap<MenuId, Menu>,
    last_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-process store.
///
/// A unit of work holds the store lock for its whole lifetime and edits a
/// private copy of the state, so units of work are serialised and an
/// uncommitted one leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let work = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, work }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl TableRepository for MemoryUnitOfWork {
    async fn create_table(&mut self, table: NewOrderTable) -> CoreResult<OrderTable> {
        let id = TableId(self.work.next_id());
        let table = OrderTable {
            id,
            table_group_id: None,
            number_of_guests: table.number_of_guests,
            empty: table.empty,
        };
        self.work.tables.insert(id, table.clone());
        Ok(table)
    }

    async fn get_table(&mut self, id: TableId) -> CoreResult<Option<OrderTable>> {
        Ok(self.work.tables.get(&id).cloned())
    }

    async fn list_tables(&mut self) -> CoreResult<Vec<OrderTable>> {
        Ok(self.work.tables.values().cloned().collect())
    }

    async fn list_tables_by_ids(&mut self, ids: &[TableId]) -> CoreResult<Vec<OrderTable>> {
        Ok(self
            .work
            .tables
            .values()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn list_tables_by_group(&mut self, group_id: TableGroupId) -> CoreResult<Vec<OrderTable>> {
        Ok(self
            .work
            .tables
            .values()
            .filter(|t| t.table_group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn update_table(&mut self, table: &OrderTable) -> CoreResult<OrderTable> {
        let slot = self
            .work
            .tables
            .get_mut(&table.id)
            .ok_or_else(|| CoreError::not_found(format!("order table {}", table.id)))?;
        *slot = table.clone();
        Ok(table.clone())
    }
}

#[async_trait]
impl TableGroupRepository for MemoryUnitOfWork {
    async fn create_table_group(&mut self, group: NewTableGroup) -> CoreResult<TableGroup> {
        let id = TableGroupId(self.work.next_id());
        let group = TableGroup {
            id,
            created_at: group.created_at,
            order_table_ids: group.order_table_ids,
        };
        self.work.table_groups.insert(id, group.clone());
        Ok(group)
    }

    async fn get_table_group(&mut self, id: TableGroupId) -> CoreResult<Option<TableGroup>> {
        Ok(self.work.table_groups.get(&id).cloned())
    }
}

#[async_trait]
impl OrderRepository for MemoryUnitOfWork {
    async fn create_order(&mut self, order: NewOrder) -> CoreResult<Order> {
        let id = OrderId(self.work.next_id());
        let order = Order {
            id,
            order_table_id: order.order_table_id,
            status: order.status,
            ordered_time: order.ordered_time,
            line_items: order.line_items,
        };
        self.work.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        Ok(self.work.orders.get(&id).cloned())
    }

    async fn list_orders(&mut self) -> CoreResult<Vec<Order>> {
        Ok(self.work.orders.values().cloned().collect())
    }

    async fn exists_by_table_ids_and_status_in(
        &mut self,
        table_ids: &[TableId],
        statuses: &[OrderStatus],
    ) -> CoreResult<bool> {
        Ok(self
            .work
            .orders
            .values()
            .any(|o| table_ids.contains(&o.order_table_id) && statuses.contains(&o.status)))
    }

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> CoreResult<()> {
        let order = self
            .work
            .orders
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found(format!("order {}", id)))?;
        order.status = status;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryUnitOfWork {
    async fn create_product(&mut self, product: NewProduct) -> CoreResult<Product> {
        let id = ProductId(self.work.next_id());
        let product = Product { id, name: product.name, price: product.price };
        self.work.products.insert(id, product.clone());
        Ok(product)
    }

    async fn list_products(&mut self) -> CoreResult<Vec<Product>> {
        Ok(self.work.products.values().cloned().collect())
    }

    async fn count_products(&mut self, ids: &[ProductId]) -> CoreResult<usize> {
        Ok(self.work.products.keys().filter(|id| ids.contains(id)).count())
    }
}

#[async_trait]
impl MenuGroupRepository for MemoryUnitOfWork {
    async fn create_menu_group(&mut self, group: NewMenuGroup) -> CoreResult<MenuGroup> {
        let id = MenuGroupId(self.work.next_id());
        let group = MenuGroup { id, name: group.name };
        self.work.menu_groups.insert(id, group.clone());
        Ok(group)
    }

    async fn get_menu_group(&mut self, id: MenuGroupId) -> CoreResult<Option<MenuGroup>> {
        Ok(self.work.menu_groups.get(&id).cloned())
    }

    async fn list_menu_groups(&mut self) -> CoreResult<Vec<MenuGroup>> {
        Ok(self.work.menu_groups.values().cloned().collect())
    }
}

#[async_trait]
impl MenuRepository for MemoryUnitOfWork {
    async fn create_menu(&mut self, menu: NewMenu) -> CoreResult<Menu> {
        let id = MenuId(self.work.next_id());
        let menu = Menu {
            id,
            name: menu.name,
            price: menu.price,
            menu_group_id: menu.menu_group_id,
            menu_products: menu.menu_products,
        };
        self.work.menus.insert(id, menu.clone());
        Ok(menu)
    }

    async fn list_menus(&mut self) -> CoreResult<Vec<Menu>> {
        Ok(self.work.menus.values().cloned().collect())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let MemoryUnitOfWork { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dine_core::catalog::MenuProduct;

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let table = tx.create_table(NewOrderTable::new(0, true).unwrap()).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get_table(table.id).await.unwrap(), Some(table));
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let store = MemoryStore::new();

        {
            let mut tx = store.begin().await.unwrap();
            tx.create_table(NewOrderTable::new(2, false).unwrap()).await.unwrap();
            // dropped without commit
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.list_tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_by_ids_skips_missing() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let a = tx.create_table(NewOrderTable::new(0, true).unwrap()).await.unwrap();
        let found = tx.list_tables_by_ids(&[a.id, TableId(999)]).await.unwrap();

        assert_eq!(found, vec![a]);
    }

    #[tokio::test]
    async fn test_menu_keeps_its_product_lines() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let group = tx
            .create_menu_group(NewMenuGroup::new("Sets").unwrap())
            .await
            .unwrap();
        let lines = vec![MenuProduct::new(ProductId(7), 2).unwrap()];
        let menu = tx
            .create_menu(NewMenu::new("Two fried chickens", 19_000, group.id, lines).unwrap())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get_menu_group(group.id).await.unwrap(), Some(group));
        assert_eq!(tx.list_menus().await.unwrap(), vec![menu]);
    }
}
