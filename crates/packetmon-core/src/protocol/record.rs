use serde::Serialize;

/// One decoded packet, tagged by packet kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedRecord {
    PlaceTileEntity(TileEntityPlacement),
    PlaceObject(ObjectPlacement),
    Tile(TileEdit),
    TileSendSquare(TileSquare),
    TileSquareBroadcast(TileSquareBroadcast),
    UpdateTileEntity(TileEntityUpdate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileEntityPlacement {
    pub x: i16,
    pub y: i16,
    pub entity_kind: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectPlacement {
    pub x: i16,
    pub y: i16,
    pub object_type: i16,
    pub style: i16,
}

/// Tile modification; shared by wire decodes and broadcast fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileEdit {
    pub action: u8,
    pub x: i16,
    pub y: i16,
    pub var1: i16,
    pub var2: u8,
    /// Set when `var1` carries the failed-attempt marker.
    pub fail: bool,
}

/// Tile square header and anchor decoded from wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSquare {
    pub header: u16,
    pub size: u16,
    pub has_change_type: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<u8>,
    pub x: i16,
    pub y: i16,
}

/// Tile square broadcast parameters after server-side clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileSquareBroadcast {
    pub size: i32,
    pub tile_x: i32,
    pub tile_y: i32,
    pub masked_size: u16,
    pub masked_size_with_flag: u16,
    pub has_change_type: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileEntityUpdate {
    pub id: i32,
    pub removed: bool,
    #[serde(flatten)]
    pub frame: Option<ItemFrameState>,
}

/// Live item-frame state attached to a tile-entity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemFrameState {
    pub entity_variant_type: u8,
    pub position_x: i16,
    pub position_y: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_stack: Option<i32>,
}

impl DecodedRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedRecord::PlaceTileEntity(_) => "place_tile_entity",
            DecodedRecord::PlaceObject(_) => "place_object",
            DecodedRecord::Tile(_) => "tile",
            DecodedRecord::TileSendSquare(_) => "tile_send_square",
            DecodedRecord::TileSquareBroadcast(_) => "tile_square_broadcast",
            DecodedRecord::UpdateTileEntity(_) => "update_tile_entity",
        }
    }
}
