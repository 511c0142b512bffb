use serde::{Deserialize, Serialize};

use crate::protocol::layout;

/// Client slot value meaning "no client".
pub const NO_CLIENT: i32 = -1;

/// Broadcast parameters the server hands to its send hook.
///
/// The meaning of `number..number5` depends on the packet type. There is no
/// separate entity id: for UpdateTileEntity, `number` carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboundFields {
    pub number: i32,
    pub number2: i32,
    pub number3: i32,
    pub number4: i32,
    pub number5: i32,
    pub ignore_client: i32,
    pub remote_client: i32,
}

impl Default for OutboundFields {
    fn default() -> Self {
        Self {
            number: 0,
            number2: 0,
            number3: 0,
            number4: 0,
            number5: 0,
            ignore_client: NO_CLIENT,
            remote_client: NO_CLIENT,
        }
    }
}

/// World dimensions in tiles, owned by the caller's world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: i32,
    pub height: i32,
}

impl Default for WorldSize {
    fn default() -> Self {
        Self {
            width: layout::DEFAULT_WORLD_WIDTH,
            height: layout::DEFAULT_WORLD_HEIGHT,
        }
    }
}
