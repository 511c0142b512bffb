use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::protocol::layout;

/// Item held by a tile entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: i32,
    pub stack: i32,
}

/// Live state of a tile entity as held by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum EntityRecord {
    ItemFrame {
        x: i16,
        y: i16,
        #[serde(default)]
        item: Option<ItemStack>,
    },
    /// Any entity kind without a dedicated shape (dummies, sensors, racks...).
    Other { kind: u8, x: i16, y: i16 },
}

impl EntityRecord {
    pub fn kind(&self) -> u8 {
        match self {
            EntityRecord::ItemFrame { .. } => layout::TILE_ENTITY_ITEM_FRAME,
            EntityRecord::Other { kind, .. } => *kind,
        }
    }
}

/// Read-only view of the server's tile-entity table.
///
/// Implementations return an owned snapshot; callers must not assume the
/// entry stays valid after the call.
pub trait TileEntityRegistry {
    fn lookup(&self, id: i32) -> Option<EntityRecord>;
}

impl TileEntityRegistry for HashMap<i32, EntityRecord> {
    fn lookup(&self, id: i32) -> Option<EntityRecord> {
        self.get(&id).cloned()
    }
}
