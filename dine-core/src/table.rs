use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, TableGroupId, TableId};

/// A physical table in the dining room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTable {
    pub id: TableId,
    pub table_group_id: Option<TableGroupId>,
    pub number_of_guests: i32,
    pub empty: bool,
}

/// Table about to be provisioned; storage assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderTable {
    pub number_of_guests: i32,
    pub empty: bool,
}

impl NewOrderTable {
    pub fn new(number_of_guests: i32, empty: bool) -> CoreResult<Self> {
        validate_guest_count(number_of_guests)?;
        Ok(Self { number_of_guests, empty })
    }
}

impl OrderTable {
    pub fn is_grouped(&self) -> bool {
        self.table_group_id.is_some()
    }

    /// Only empty, ungrouped tables may be merged into a new group.
    pub fn ensure_groupable(&self) -> CoreResult<()> {
        if !self.empty {
            return Err(CoreError::validation(format!(
                "table {} is occupied and cannot be grouped",
                self.id
            )));
        }
        if let Some(group_id) = self.table_group_id {
            return Err(CoreError::validation(format!(
                "table {} already belongs to table group {}",
                self.id, group_id
            )));
        }
        Ok(())
    }

    /// Join a group. A grouped table is occupied as part of the whole group.
    /// Reserved for the grouping service, which owns membership.
    pub fn assign_group(&mut self, group_id: TableGroupId) {
        self.table_group_id = Some(group_id);
        self.empty = false;
    }

    /// Drop the back reference to the group; occupancy is left untouched.
    pub fn release_group(&mut self) {
        self.table_group_id = None;
    }

    pub fn change_empty(&mut self, empty: bool) -> CoreResult<()> {
        if let Some(group_id) = self.table_group_id {
            return Err(CoreError::validation(format!(
                "table {} is part of table group {}; ungroup it first",
                self.id, group_id
            )));
        }
        self.empty = empty;
        Ok(())
    }

    pub fn change_number_of_guests(&mut self, number_of_guests: i32) -> CoreResult<()> {
        validate_guest_count(number_of_guests)?;
        if self.empty {
            return Err(CoreError::validation(format!(
                "table {} is empty; seat it before setting guests",
                self.id
            )));
        }
        self.number_of_guests = number_of_guests;
        Ok(())
    }
}

fn validate_guest_count(number_of_guests: i32) -> CoreResult<()> {
    if number_of_guests < 0 {
        return Err(CoreError::validation(format!(
            "number of guests must not be negative, got {}",
            number_of_guests
        )));
    }
    Ok(())
}

/// A set of at least two tables merged for billing and occupancy.
///
/// The group is the sole owner of its membership list. Member tables only
/// carry the group id back, and membership never changes after creation;
/// the group is dissolved as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGroup {
    pub id: TableGroupId,
    pub created_at: DateTime<Utc>,
    pub order_table_ids: Vec<TableId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTableGroup {
    pub created_at: DateTime<Utc>,
    pub order_table_ids: Vec<TableId>,
}

pub const MIN_GROUP_SIZE: usize = 2;

impl NewTableGroup {
    /// Checks the shape of the requested membership: size and uniqueness.
    /// Table state is checked separately once the tables are loaded.
    pub fn new(order_table_ids: Vec<TableId>, created_at: DateTime<Utc>) -> CoreResult<Self> {
        if order_table_ids.len() < MIN_GROUP_SIZE {
            return Err(CoreError::validation(format!(
                "a table group needs at least {} tables, got {}",
                MIN_GROUP_SIZE,
                order_table_ids.len()
            )));
        }

        let mut seen = std::collections::HashSet::with_capacity(order_table_ids.len());
        if let Some(dup) = order_table_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(CoreError::validation(format!(
                "table {} is listed more than once",
                dup
            )));
        }

        Ok(Self { created_at, order_table_ids })
    }
}
