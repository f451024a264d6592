use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TABLE_CAPACITY;
use crate::id::new_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 {
    DEFAULT_TABLE_CAPACITY
}

impl Table {
    pub fn new(name: &str, capacity: u32) -> Self {
        Table {
            id: new_id(),
            name: name.to_string(),
            capacity,
        }
    }

    /// Default table for position `n` (1-based): "Mesa n", ten seats.
    pub fn numbered(n: usize) -> Self {
        Table::new(&format!("Mesa {n}"), DEFAULT_TABLE_CAPACITY)
    }
}
