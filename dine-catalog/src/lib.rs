pub mod product;
pub mod menu_group;
pub mod menu;

pub use product::ProductService;
pub use menu_group::MenuGroupService;
pub use menu::MenuService;
