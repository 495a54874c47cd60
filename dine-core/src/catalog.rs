use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, MenuGroupId, MenuId, ProductId};

/// Sellable product. Prices are kept in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: i64) -> CoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::validation("product name must not be blank"));
        }
        if price < 0 {
            return Err(CoreError::validation(format!(
                "product price must not be negative, got {}",
                price
            )));
        }
        Ok(Self { name, price })
    }
}

/// Heading that menus are filed under ("Mains", "Drinks", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub id: MenuGroupId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenuGroup {
    pub name: String,
}

impl NewMenuGroup {
    pub fn new(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::validation("menu group name must not be blank"));
        }
        Ok(Self { name })
    }
}

/// One product line of a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuProduct {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl MenuProduct {
    pub fn new(product_id: ProductId, quantity: i64) -> CoreResult<Self> {
        if quantity <= 0 {
            return Err(CoreError::validation(format!(
                "menu quantity for product {} must be positive, got {}",
                product_id, quantity
            )));
        }
        Ok(Self { product_id, quantity })
    }
}

/// Priced bundle of products filed under a menu group.
///
/// The price is set by hand; it is not derived from the product prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub id: MenuId,
    pub name: String,
    pub price: i64,
    pub menu_group_id: MenuGroupId,
    pub menu_products: Vec<MenuProduct>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenu {
    pub name: String,
    pub price: i64,
    pub menu_group_id: MenuGroupId,
    pub menu_products: Vec<MenuProduct>,
}

impl NewMenu {
    pub fn new(
        name: impl Into<String>,
        price: i64,
        menu_group_id: MenuGroupId,
        menu_products: Vec<MenuProduct>,
    ) -> CoreResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::validation("menu name must not be blank"));
        }
        if price < 0 {
            return Err(CoreError::validation(format!(
                "menu price must not be negative, got {}",
                price
            )));
        }
        Ok(Self { name, price, menu_group_id, menu_products })
    }

    /// Distinct products the menu refers to.
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.menu_products.iter().map(|p| p.product_id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
