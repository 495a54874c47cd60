use dine_core::catalog::{MenuGroup, NewMenuGroup};
use dine_core::repository::MenuGroupRepository;
use dine_core::CoreResult;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct MenuGroupService;

impl MenuGroupService {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<U>(&self, tx: &mut U, name: String) -> CoreResult<MenuGroup>
    where
        U: MenuGroupRepository + ?Sized,
    {
        let group = tx.create_menu_group(NewMenuGroup::new(name)?).await?;
        info!("Menu group {} ({}) created", group.id, group.name);
        Ok(group)
    }

    pub async fn list<U>(&self, tx: &mut U) -> CoreResult<Vec<MenuGroup>>
    where
        U: MenuGroupRepository + ?Sized,
    {
        tx.list_menu_groups().await
    }
}
