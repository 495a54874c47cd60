use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;

use dine_core::catalog::{
    Menu, MenuGroup, MenuProduct, NewMenu, NewMenuGroup, NewProduct, Product,
};
use dine_core::order::{NewOrder, Order, OrderLineItem, OrderStatus};
use dine_core::repository::{
    MenuGroupRepository, MenuRepository, OrderRepository, ProductRepository, Store, TableGroupRepository,
    TableRepository, UnitOfWork,
};
use dine_core::table::{NewOrderTable, NewTableGroup, OrderTable, TableGroup};
use dine_core::{
    CoreError, CoreResult, MenuGroupId, MenuId, OrderId, ProductId, TableGroupId, TableId,
};

fn db_err(e: sqlx::Error) -> CoreError {
    tracing::error!("Database error: {}", e);
    CoreError::InternalError(e.to_string())
}

/// Postgres-backed store. Each unit of work is one database transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> CoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(db_err)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Rolls back on drop unless committed.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct TableRow {
    id: i64,
    table_group_id: Option<i64>,
    number_of_guests: i32,
    empty: bool,
}

impl From<TableRow> for OrderTable {
    fn from(row: TableRow) -> Self {
        OrderTable {
            id: TableId(row.id),
            table_group_id: row.table_group_id.map(TableGroupId),
            number_of_guests: row.number_of_guests,
            empty: row.empty,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TableGroupRow {
    id: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_table_id: i64,
    order_status: String,
    ordered_time: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineItemRow {
    order_id: i64,
    product_id: i64,
    quantity: i64,
}

impl OrderRow {
    fn into_order(self, line_items: Vec<OrderLineItem>) -> CoreResult<Order> {
        Ok(Order {
            id: OrderId(self.id),
            order_table_id: TableId(self.order_table_id),
            status: self.order_status.parse::<OrderStatus>().map_err(|e| {
                CoreError::InternalError(format!("order {} has a corrupt status: {}", self.id, e))
            })?,
            ordered_time: self.ordered_time,
            line_items,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: i64,
}

#[derive(sqlx::FromRow)]
struct MenuGroupRow {
    id: i64,
    name: String,
}

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: i64,
    name: String,
    price: i64,
    menu_group_id: i64,
}

#[derive(sqlx::FromRow)]
struct MenuProductRow {
    menu_id: i64,
    product_id: i64,
    quantity: i64,
}

impl MenuRow {
    fn into_menu(self, menu_products: Vec<MenuProduct>) -> Menu {
        Menu {
            id: MenuId(self.id),
            name: self.name,
            price: self.price,
            menu_group_id: MenuGroupId(self.menu_group_id),
            menu_products,
        }
    }
}

const TABLE_COLUMNS: &str = "id, table_group_id, number_of_guests, empty";

fn raw_ids<T: Copy + Into<i64>>(ids: &[T]) -> Vec<i64> {
    ids.iter().map(|id| (*id).into()).collect()
}

#[async_trait]
impl TableRepository for PgUnitOfWork {
    async fn create_table(&mut self, table: NewOrderTable) -> CoreResult<OrderTable> {
        let row = sqlx::query_as::<_, TableRow>(&format!(
            "INSERT INTO order_tables (table_group_id, number_of_guests, empty) \
             VALUES (NULL, $1, $2) RETURNING {}",
            TABLE_COLUMNS
        ))
        .bind(table.number_of_guests)
        .bind(table.empty)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    async fn get_table(&mut self, id: TableId) -> CoreResult<Option<OrderTable>> {
        let row = sqlx::query_as::<_, TableRow>(&format!(
            "SELECT {} FROM order_tables WHERE id = $1 FOR UPDATE",
            TABLE_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    async fn list_tables(&mut self) -> CoreResult<Vec<OrderTable>> {
        let rows = sqlx::query_as::<_, TableRow>(&format!(
            "SELECT {} FROM order_tables ORDER BY id",
            TABLE_COLUMNS
        ))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_tables_by_ids(&mut self, ids: &[TableId]) -> CoreResult<Vec<OrderTable>> {
        let rows = sqlx::query_as::<_, TableRow>(&format!(
            "SELECT {} FROM order_tables WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            TABLE_COLUMNS
        ))
        .bind(raw_ids(ids))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_tables_by_group(&mut self, group_id: TableGroupId) -> CoreResult<Vec<OrderTable>> {
        let rows = sqlx::query_as::<_, TableRow>(&format!(
            "SELECT {} FROM order_tables WHERE table_group_id = $1 ORDER BY id FOR UPDATE",
            TABLE_COLUMNS
        ))
        .bind(group_id.0)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_table(&mut self, table: &OrderTable) -> CoreResult<OrderTable> {
        let row = sqlx::query_as::<_, TableRow>(&format!(
            "UPDATE order_tables SET table_group_id = $2, number_of_guests = $3, empty = $4 \
             WHERE id = $1 RETURNING {}",
            TABLE_COLUMNS
        ))
        .bind(table.id.0)
        .bind(table.table_group_id.map(|g| g.0))
        .bind(table.number_of_guests)
        .bind(table.empty)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(Into::into)
            .ok_or_else(|| CoreError::not_found(format!("order table {}", table.id)))
    }
}

#[async_trait]
impl TableGroupRepository for PgUnitOfWork {
    async fn create_table_group(&mut self, group: NewTableGroup) -> CoreResult<TableGroup> {
        let row = sqlx::query_as::<_, TableGroupRow>(
            "INSERT INTO table_groups (created_at) VALUES ($1) RETURNING id, created_at",
        )
        .bind(group.created_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        for (position, table_id) in group.order_table_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO table_group_members (table_group_id, position, order_table_id) \
                 VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(position as i32)
            .bind(table_id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        }

        Ok(TableGroup {
            id: TableGroupId(row.id),
            created_at: row.created_at,
            order_table_ids: group.order_table_ids,
        })
    }

    async fn get_table_group(&mut self, id: TableGroupId) -> CoreResult<Option<TableGroup>> {
        let row = sqlx::query_as::<_, TableGroupRow>(
            "SELECT id, created_at FROM table_groups WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let members: Vec<i64> = sqlx::query_scalar(
            "SELECT order_table_id FROM table_group_members \
             WHERE table_group_id = $1 ORDER BY position",
        )
        .bind(row.id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(Some(TableGroup {
            id: TableGroupId(row.id),
            created_at: row.created_at,
            order_table_ids: members.into_iter().map(TableId).collect(),
        }))
    }
}

#[async_trait]
impl OrderRepository for PgUnitOfWork {
    async fn create_order(&mut self, order: NewOrder) -> CoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (order_table_id, order_status, ordered_time) VALUES ($1, $2, $3) \
             RETURNING id, order_table_id, order_status, ordered_time",
        )
        .bind(order.order_table_id.0)
        .bind(order.status.as_str())
        .bind(order.ordered_time)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        for item in &order.line_items {
            sqlx::query(
                "INSERT INTO order_line_items (order_id, product_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(item.product_id.0)
            .bind(item.quantity)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        }

        row.into_order(order.line_items)
    }

    async fn get_order(&mut self, id: OrderId) -> CoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_table_id, order_status, ordered_time FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderLineItemRow>(
            "SELECT order_id, product_id, quantity FROM order_line_items \
             WHERE order_id = $1 ORDER BY seq",
        )
        .bind(row.id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let line_items = items
            .into_iter()
            .map(|item| OrderLineItem {
                product_id: ProductId(item.product_id),
                quantity: item.quantity,
            })
            .collect();

        row.into_order(line_items).map(Some)
    }

    async fn list_orders(&mut self) -> CoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, order_table_id, order_status, ordered_time FROM orders ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let items = sqlx::query_as::<_, OrderLineItemRow>(
            "SELECT order_id, product_id, quantity FROM order_line_items ORDER BY seq",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let mut items_by_order: HashMap<i64, Vec<OrderLineItem>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(OrderLineItem {
                product_id: ProductId(item.product_id),
                quantity: item.quantity,
            });
        }

        rows.into_iter()
            .map(|row| {
                let line_items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(line_items)
            })
            .collect()
    }

    async fn exists_by_table_ids_and_status_in(
        &mut self,
        table_ids: &[TableId],
        statuses: &[OrderStatus],
    ) -> CoreResult<bool> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM orders WHERE order_table_id = ANY($1) AND order_status = ANY($2))",
        )
        .bind(raw_ids(table_ids))
        .bind(statuses)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)
    }

    async fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> CoreResult<()> {
        let result = sqlx::query("UPDATE orders SET order_status = $2 WHERE id = $1")
            .bind(id.0)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!("order {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PgUnitOfWork {
    async fn create_product(&mut self, product: NewProduct) -> CoreResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, price) VALUES ($1, $2) RETURNING id, name, price",
        )
        .bind(&product.name)
        .bind(product.price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(Product { id: ProductId(row.id), name: row.name, price: row.price })
    }

    async fn list_products(&mut self) -> CoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT id, name, price FROM products ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| Product { id: ProductId(row.id), name: row.name, price: row.price })
            .collect())
    }

    async fn count_products(&mut self, ids: &[ProductId]) -> CoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ANY($1)")
            .bind(raw_ids(ids))
            .fetch_one(&mut *self.tx)
            .await
            .map_err(db_err)?;

        Ok(count as usize)
    }
}

#[async_trait]
impl MenuGroupRepository for PgUnitOfWork {
    async fn create_menu_group(&mut self, group: NewMenuGroup) -> CoreResult<MenuGroup> {
        let row = sqlx::query_as::<_, MenuGroupRow>(
            "INSERT INTO menu_groups (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&group.name)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        Ok(MenuGroup { id: MenuGroupId(row.id), name: row.name })
    }

    async fn get_menu_group(&mut self, id: MenuGroupId) -> CoreResult<Option<MenuGroup>> {
        let row = sqlx::query_as::<_, MenuGroupRow>("SELECT id, name FROM menu_groups WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_err)?;

        Ok(row.map(|row| MenuGroup { id: MenuGroupId(row.id), name: row.name }))
    }

    async fn list_menu_groups(&mut self) -> CoreResult<Vec<MenuGroup>> {
        let rows = sqlx::query_as::<_, MenuGroupRow>("SELECT id, name FROM menu_groups ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| MenuGroup { id: MenuGroupId(row.id), name: row.name })
            .collect())
    }
}

#[async_trait]
impl MenuRepository for PgUnitOfWork {
    async fn create_menu(&mut self, menu: NewMenu) -> CoreResult<Menu> {
        let row = sqlx::query_as::<_, MenuRow>(
            "INSERT INTO menus (name, price, menu_group_id) VALUES ($1, $2, $3) \
             RETURNING id, name, price, menu_group_id",
        )
        .bind(&menu.name)
        .bind(menu.price)
        .bind(menu.menu_group_id.0)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        for line in &menu.menu_products {
            sqlx::query("INSERT INTO menu_products (menu_id, product_id, quantity) VALUES ($1, $2, $3)")
                .bind(row.id)
                .bind(line.product_id.0)
                .bind(line.quantity)
                .execute(&mut *self.tx)
                .await
                .map_err(db_err)?;
        }

        Ok(row.into_menu(menu.menu_products))
    }

    async fn list_menus(&mut self) -> CoreResult<Vec<Menu>> {
        let rows = sqlx::query_as::<_, MenuRow>(
            "SELECT id, name, price, menu_group_id FROM menus ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let lines = sqlx::query_as::<_, MenuProductRow>(
            "SELECT menu_id, product_id, quantity FROM menu_products ORDER BY seq",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;

        let mut lines_by_menu: HashMap<i64, Vec<MenuProduct>> = HashMap::new();
        for line in lines {
            lines_by_menu.entry(line.menu_id).or_default().push(MenuProduct {
                product_id: ProductId(line.product_id),
                quantity: line.quantity,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let menu_products = lines_by_menu.remove(&row.id).unwrap_or_default();
                row.into_menu(menu_products)
            })
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> CoreResult<()> {
        let PgUnitOfWork { tx } = *self;
        tx.commit().await.map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_row(status: &str) -> OrderRow {
        OrderRow {
            id: 9,
            order_table_id: 1,
            order_status: status.to_string(),
            ordered_time: Utc::now(),
        }
    }

    #[test]
    fn test_order_row_status_parsing() {
        let order = order_row("MEAL").into_order(vec![]).unwrap();
        assert_eq!(order.status, OrderStatus::Meal);
    }

    #[test]
    fn test_corrupt_stored_status_is_internal() {
        let result = order_row("SERVED").into_order(vec![]);
        assert!(matches!(result, Err(CoreError::InternalError(_))));
    }
}
