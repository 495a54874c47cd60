pub mod grouping;
pub mod table_service;

pub use grouping::{GroupedTables, TableGroupService};
pub use table_service::TableService;
