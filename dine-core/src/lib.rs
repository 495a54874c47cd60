pub mod ids;
pub mod clock;
pub mod table;
pub mod order;
pub mod catalog;
pub mod repository;

pub use ids::{MenuGroupId, MenuId, OrderId, ProductId, TableGroupId, TableId};
pub use clock::{Clock, FixedClock, SystemClock};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
