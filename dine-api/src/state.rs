use std::sync::Arc;

use dine_catalog::{MenuGroupService, MenuService, ProductService};
use dine_core::repository::Store;
use dine_core::Clock;
use dine_order::OrderManager;
use dine_table::{TableGroupService, TableService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tables: TableService,
    pub table_groups: Arc<TableGroupService>,
    pub orders: Arc<OrderManager>,
    pub products: ProductService,
    pub menu_groups: MenuGroupService,
    pub menus: MenuService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            tables: TableService::new(),
            table_groups: Arc::new(TableGroupService::new(clock.clone())),
            orders: Arc::new(OrderManager::new(clock)),
            products: ProductService::new(),
            menu_groups: MenuGroupService::new(),
            menus: MenuService::new(),
        }
    }
}
