use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use dine_core::catalog::{Menu, MenuGroup, MenuProduct, Product};
use dine_core::{CoreResult, MenuGroupId, MenuId, ProductId};

use crate::{error::{AppError, AppJson}, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self { id: product.id, name: product.name, price: product.price }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuGroupRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuGroupResponse {
    pub id: MenuGroupId,
    pub name: String,
}

impl From<MenuGroup> for MenuGroupResponse {
    fn from(group: MenuGroup) -> Self {
        Self { id: group.id, name: group.name }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    pub price: i64,
    pub menu_group_id: MenuGroupId,
    pub menu_products: Vec<MenuProductRequest>,
}

#[derive(Debug, Deserialize)]
pub struct MenuProductRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuResponse {
    pub id: MenuId,
    pub name: String,
    pub price: i64,
    pub menu_group_id: MenuGroupId,
    pub menu_products: Vec<MenuProductResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MenuProductResponse {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl From<Menu> for MenuResponse {
    fn from(menu: Menu) -> Self {
        Self {
            id: menu.id,
            name: menu.name,
            price: menu.price,
            menu_group_id: menu.menu_group_id,
            menu_products: menu
                .menu_products
                .into_iter()
                .map(|line| MenuProductResponse { product_id: line.product_id, quantity: line.quantity })
                .collect(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/menu-groups", get(list_menu_groups).post(create_menu_group))
        .route("/api/menus", get(list_menus).post(create_menu))
}

async fn create_product(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let mut tx = state.store.begin().await?;
    let product = state.products.create(&mut *tx, req.name, req.price).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let mut tx = state.store.begin().await?;
    let products = state.products.list(&mut *tx).await?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn create_menu_group(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateMenuGroupRequest>,
) -> Result<(StatusCode, Json<MenuGroupResponse>), AppError> {
    let mut tx = state.store.begin().await?;
    let group = state.menu_groups.create(&mut *tx, req.name).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(group.into())))
}

async fn list_menu_groups(State(state): State<AppState>) -> Result<Json<Vec<MenuGroupResponse>>, AppError> {
    let mut tx = state.store.begin().await?;
    let groups = state.menu_groups.list(&mut *tx).await?;

    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

async fn create_menu(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateMenuRequest>,
) -> Result<(StatusCode, Json<MenuResponse>), AppError> {
    let menu_products = req
        .menu_products
        .into_iter()
        .map(|line| MenuProduct::new(line.product_id, line.quantity))
        .collect::<CoreResult<Vec<_>>>()?;

    let mut tx = state.store.begin().await?;
    let menu = state
        .menus
        .create(&mut *tx, req.name, req.price, req.menu_group_id, menu_products)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(menu.into())))
}

async fn list_menus(State(state): State<AppState>) -> Result<Json<Vec<MenuResponse>>, AppError> {
    let mut tx = state.store.begin().await?;
    let menus = state.menus.list(&mut *tx).await?;

    Ok(Json(menus.into_iter().map(Into::into).collect()))
}
