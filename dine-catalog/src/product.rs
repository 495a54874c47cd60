use dine_core::catalog::{NewProduct, Product};
use dine_core::repository::ProductRepository;
use dine_core::CoreResult;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProductService;

impl ProductService {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<U>(&self, tx: &mut U, name: String, price: i64) -> CoreResult<Product>
    where
        U: ProductRepository + ?Sized,
    {
        let product = tx.create_product(NewProduct::new(name, price)?).await?;
        info!("Product {} ({}) added to catalog", product.id, product.name);
        Ok(product)
    }

    pub async fn list<U>(&self, tx: &mut U) -> CoreResult<Vec<Product>>
    where
        U: ProductRepository + ?Sized,
    {
        tx.list_products().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dine_core::repository::Store;
    use dine_core::CoreError;
    use dine_store::MemoryStore;

    #[tokio::test]
    async fn test_product_catalog() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let service = ProductService::new();

        let chicken = service.create(&mut *tx, "Fried chicken".into(), 16_000).await.unwrap();
        assert_eq!(chicken.price, 16_000);

        assert!(matches!(
            service.create(&mut *tx, "Spicy chicken".into(), -1).await,
            Err(CoreError::ValidationError(_))
        ));
        assert_eq!(service.list(&mut *tx).await.unwrap(), vec![chicken]);
    }
}
