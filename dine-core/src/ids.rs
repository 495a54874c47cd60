use serde::{Deserialize, Serialize};
use std::fmt;

// Storage assigns every identifier, so they are all BIGSERIAL-backed.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Physical table
    TableId
);
entity_id!(
    /// Group of merged tables
    TableGroupId
);
entity_id!(OrderId);
entity_id!(ProductId);
entity_id!(MenuGroupId);
entity_id!(MenuId);
