use dine_core::catalog::{Menu, MenuProduct, NewMenu};
use dine_core::repository::{MenuGroupRepository, MenuRepository, ProductRepository};
use dine_core::{CoreError, CoreResult, MenuGroupId};
use tracing::{info, warn};

/// Menus are priced by hand; the price is not checked against product prices.
#[derive(Debug, Default, Clone, Copy)]
pub struct MenuService;

impl MenuService {
    pub fn new() -> Self {
        Self
    }

    /// File a new menu under an existing group. Every product line must point
    /// at a known product.
    pub async fn create<U>(
        &self,
        tx: &mut U,
        name: String,
        price: i64,
        menu_group_id: MenuGroupId,
        menu_products: Vec<MenuProduct>,
    ) -> CoreResult<Menu>
    where
        U: MenuRepository + MenuGroupRepository + ProductRepository + ?Sized,
    {
        let new_menu = NewMenu::new(name, price, menu_group_id, menu_products)?;

        if tx.get_menu_group(menu_group_id).await?.is_none() {
            warn!("Rejected menu {}: unknown menu group {}", new_menu.name, menu_group_id);
            return Err(CoreError::validation(format!(
                "menu group {} does not exist",
                menu_group_id
            )));
        }

        let product_ids = new_menu.product_ids();
        if tx.count_products(&product_ids).await? != product_ids.len() {
            warn!("Rejected menu {}: unknown products", new_menu.name);
            return Err(CoreError::validation("menu references unknown products"));
        }

        let menu = tx.create_menu(new_menu).await?;
        info!("Menu {} ({}) filed under group {}", menu.id, menu.name, menu.menu_group_id);
        Ok(menu)
    }

    pub async fn list<U>(&self, tx: &mut U) -> CoreResult<Vec<Menu>>
    where
        U: MenuRepository + ?Sized,
    {
        tx.list_menus().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dine_core::catalog::{NewMenuGroup, NewProduct};
    use dine_core::repository::Store;
    use dine_core::ProductId;
    use dine_store::MemoryStore;

    #[tokio::test]
    async fn test_menu_catalog() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let service = MenuService::new();

        let group = tx.create_menu_group(NewMenuGroup::new("Sets").unwrap()).await.unwrap();
        let chicken = tx
            .create_product(NewProduct::new("Fried chicken", 16_000).unwrap())
            .await
            .unwrap();
        let lines = vec![MenuProduct::new(chicken.id, 2).unwrap()];

        // priced below the sum of its products, which is allowed
        let menu = service
            .create(&mut *tx, "Two fried chickens".into(), 19_000, group.id, lines)
            .await
            .unwrap();
        assert_eq!(menu.menu_group_id, group.id);
        assert_eq!(menu.menu_products[0].quantity, 2);
        assert_eq!(service.list(&mut *tx).await.unwrap(), vec![menu]);
    }

    #[tokio::test]
    async fn test_menu_references_must_exist() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let service = MenuService::new();

        let group = tx.create_menu_group(NewMenuGroup::new("Sets").unwrap()).await.unwrap();
        let chicken = tx
            .create_product(NewProduct::new("Fried chicken", 16_000).unwrap())
            .await
            .unwrap();

        let unknown_group = service
            .create(
                &mut *tx,
                "Orphan".into(),
                16_000,
                MenuGroupId(404),
                vec![MenuProduct::new(chicken.id, 1).unwrap()],
            )
            .await;
        assert!(matches!(unknown_group, Err(CoreError::ValidationError(_))));

        let unknown_product = service
            .create(
                &mut *tx,
                "Ghost set".into(),
                16_000,
                group.id,
                vec![
                    MenuProduct::new(chicken.id, 1).unwrap(),
                    MenuProduct::new(ProductId(999), 1).unwrap(),
                ],
            )
            .await;
        assert!(matches!(unknown_product, Err(CoreError::ValidationError(_))));

        let negative_price = service
            .create(&mut *tx, "Refund set".into(), -1, group.id, vec![])
            .await;
        assert!(matches!(negative_price, Err(CoreError::ValidationError(_))));

        assert!(service.list(&mut *tx).await.unwrap().is_empty());
    }
}
