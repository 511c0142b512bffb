use crate::protocol::classify::{DecoderKind, Direction, decoder_for};
use crate::protocol::error::DecodeError;
use crate::protocol::layout;
use crate::protocol::record::{
    DecodedRecord, ItemFrameState, TileEdit, TileEntityUpdate, TileSquareBroadcast,
};

use super::fields::{OutboundFields, WorldSize};
use super::registry::{EntityRecord, TileEntityRegistry};

/// Adapt broadcast fields of an outbound message into a record.
///
/// The registry is consulted only for tile-entity updates, once per call.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
///
/// use packetmon_core::{
///     DecodedRecord, EntityRecord, OutboundFields, WorldSize, decode_outbound,
/// };
///
/// let registry: HashMap<i32, EntityRecord> = HashMap::new();
/// let fields = OutboundFields {
///     number: -3,
///     number2: 2,
///     number3: 2,
///     ..OutboundFields::default()
/// };
/// let record = decode_outbound(20, &fields, WorldSize::default(), &registry)?;
/// let DecodedRecord::TileSquareBroadcast(square) = record else {
///     unreachable!()
/// };
/// assert_eq!(square.size, 0);
/// assert_eq!(square.masked_size_with_flag, 0x8000);
/// # Ok::<(), packetmon_core::DecodeError>(())
/// ```
pub fn decode_outbound<R: TileEntityRegistry + ?Sized>(
    tag: u8,
    fields: &OutboundFields,
    world: WorldSize,
    registry: &R,
) -> Result<DecodedRecord, DecodeError> {
    let unknown = DecodeError::UnknownPacketType {
        tag,
        direction: Direction::Outbound,
    };
    match decoder_for(tag, Direction::Outbound).ok_or(unknown.clone())? {
        DecoderKind::UpdateTileEntity => adapt_update_tile_entity(fields.number, registry),
        DecoderKind::Tile => adapt_tile(fields),
        DecoderKind::TileSendSquare => adapt_tile_square(fields, world),
        DecoderKind::PlaceTileEntity | DecoderKind::PlaceObject => Err(unknown),
    }
}

pub fn adapt_update_tile_entity<R: TileEntityRegistry + ?Sized>(
    id: i32,
    registry: &R,
) -> Result<DecodedRecord, DecodeError> {
    let frame = match registry.lookup(id) {
        None => None,
        Some(EntityRecord::ItemFrame { x, y, item }) => Some(ItemFrameState {
            entity_variant_type: layout::TILE_ENTITY_ITEM_FRAME,
            position_x: x,
            position_y: y,
            item_type: item.map(|item| item.item_type),
            item_stack: item.map(|item| item.stack),
        }),
        Some(other) => {
            return Err(DecodeError::UnsupportedEntityVariant {
                id,
                kind: other.kind(),
            });
        }
    };
    Ok(DecodedRecord::UpdateTileEntity(TileEntityUpdate {
        id,
        removed: frame.is_none(),
        frame,
    }))
}

pub fn adapt_tile(fields: &OutboundFields) -> Result<DecodedRecord, DecodeError> {
    let var1: i16 = narrow("number4", fields.number4, "i16")?;
    Ok(DecodedRecord::Tile(TileEdit {
        action: narrow("number", fields.number, "u8")?,
        x: narrow("number2", fields.number2, "i16")?,
        y: narrow("number3", fields.number3, "i16")?,
        var1,
        var2: narrow("number5", fields.number5, "u8")?,
        fail: var1 == layout::TILE_FAIL_MARKER,
    }))
}

/// Tile square broadcast: size is floored at zero and the anchor is pulled
/// back inside `[size, extent + size)` on each axis, as the server does
/// before writing the packet.
pub fn adapt_tile_square(
    fields: &OutboundFields,
    world: WorldSize,
) -> Result<DecodedRecord, DecodeError> {
    let size = fields.number.max(0);
    let tile_x = clamp_anchor("number2", fields.number2, size, world.width)?;
    let tile_y = clamp_anchor("number3", fields.number3, size, world.height)?;
    // Lossless: the mask keeps 15 bits.
    let masked_size = (size & i32::from(layout::TILE_SQUARE_SIZE_MASK)) as u16;
    Ok(DecodedRecord::TileSquareBroadcast(TileSquareBroadcast {
        size,
        tile_x,
        tile_y,
        masked_size,
        masked_size_with_flag: masked_size | layout::TILE_SQUARE_CHANGE_TYPE_FLAG,
        has_change_type: fields.number5 != 0,
    }))
}

fn clamp_anchor(
    field: &'static str,
    value: i32,
    size: i32,
    extent: i32,
) -> Result<i32, DecodeError> {
    let size = i64::from(size);
    let extent = i64::from(extent);
    let mut anchor = i64::from(value);
    if anchor >= extent + size {
        anchor = extent - size - 1;
    }
    if anchor < size {
        anchor = size;
    }
    i32::try_from(anchor).map_err(|_| DecodeError::FieldOverflow {
        field,
        value: anchor,
        target: "i32",
    })
}

fn narrow<T: TryFrom<i32>>(
    field: &'static str,
    value: i32,
    target: &'static str,
) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| DecodeError::FieldOverflow {
        field,
        value: i64::from(value),
        target,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use super::*;
    use crate::outbound::registry::ItemStack;

    struct CountingRegistry {
        inner: HashMap<i32, EntityRecord>,
        lookups: Cell<u32>,
    }

    impl CountingRegistry {
        fn new(entries: impl IntoIterator<Item = (i32, EntityRecord)>) -> Self {
            Self {
                inner: entries.into_iter().collect(),
                lookups: Cell::new(0),
            }
        }

        fn empty() -> Self {
            Self::new(Vec::<(i32, EntityRecord)>::new())
        }
    }

    impl TileEntityRegistry for CountingRegistry {
        fn lookup(&self, id: i32) -> Option<EntityRecord> {
            self.lookups.set(self.lookups.get() + 1);
            self.inner.lookup(id)
        }
    }

    fn broadcast(fields: OutboundFields, world: WorldSize) -> TileSquareBroadcast {
        match adapt_tile_square(&fields, world).unwrap() {
            DecodedRecord::TileSquareBroadcast(square) => square,
            other => panic!("unexpected record {other:?}"),
        }
    }

    fn fields(number: i32, number2: i32, number3: i32) -> OutboundFields {
        OutboundFields {
            number,
            number2,
            number3,
            ..OutboundFields::default()
        }
    }

    #[test]
    fn negative_size_is_floored_and_anchor_passes_through() {
        let world = WorldSize {
            width: 8400,
            height: 2400,
        };
        let square = broadcast(fields(-3, 2, 2), world);
        assert_eq!(square.size, 0);
        assert_eq!((square.tile_x, square.tile_y), (2, 2));
        assert_eq!(square.masked_size, 0);
        assert_eq!(square.masked_size_with_flag, 0x8000);
        assert!(!square.has_change_type);
    }

    #[test]
    fn anchor_past_far_edge_is_reflected() {
        let world = WorldSize {
            width: 100,
            height: 50,
        };
        let square = broadcast(fields(3, 103, 60), world);
        assert_eq!(square.tile_x, 96);
        assert_eq!(square.tile_y, 46);

        let square = square_at(3, 102, 52, world);
        assert_eq!((square.tile_x, square.tile_y), (102, 52));
    }

    fn square_at(size: i32, x: i32, y: i32, world: WorldSize) -> TileSquareBroadcast {
        broadcast(fields(size, x, y), world)
    }

    #[test]
    fn anchor_below_size_snaps_to_size() {
        let world = WorldSize::default();
        let square = square_at(4, 1, -20, world);
        assert_eq!((square.tile_x, square.tile_y), (4, 4));
    }

    #[test]
    fn tiny_world_falls_back_to_size() {
        let world = WorldSize {
            width: 2,
            height: 2,
        };
        let square = square_at(5, 40, 0, world);
        assert_eq!((square.tile_x, square.tile_y), (5, 5));
    }

    #[test]
    fn masked_size_keeps_fifteen_bits() {
        let square = square_at(0x1_8005, 0x1_8005, 0x1_8005, WorldSize::default());
        assert_eq!(square.masked_size, 0x0005);
        assert_eq!(square.masked_size_with_flag, 0x8005);
    }

    #[test]
    fn change_type_flag_follows_number5() {
        let mut input = fields(1, 10, 10);
        input.number5 = 2;
        let square = broadcast(input, WorldSize::default());
        assert!(square.has_change_type);
    }

    #[test]
    fn tile_fields_are_narrowed() {
        let input = OutboundFields {
            number: 1,
            number2: 300,
            number3: -40,
            number4: 1,
            number5: 9,
            ..OutboundFields::default()
        };
        let record = adapt_tile(&input).unwrap();
        assert_eq!(
            record,
            DecodedRecord::Tile(TileEdit {
                action: 1,
                x: 300,
                y: -40,
                var1: 1,
                var2: 9,
                fail: true,
            })
        );
    }

    #[test]
    fn tile_field_overflow_is_reported() {
        let input = OutboundFields {
            number: 256,
            ..OutboundFields::default()
        };
        assert_eq!(
            adapt_tile(&input).unwrap_err(),
            DecodeError::FieldOverflow {
                field: "number",
                value: 256,
                target: "u8",
            }
        );

        let input = OutboundFields {
            number2: 40_000,
            ..OutboundFields::default()
        };
        assert!(matches!(
            adapt_tile(&input),
            Err(DecodeError::FieldOverflow { field: "number2", .. })
        ));
    }

    #[test]
    fn absent_entity_is_removed_after_single_lookup() {
        let registry = CountingRegistry::empty();
        let record = adapt_update_tile_entity(42, &registry).unwrap();
        assert_eq!(
            record,
            DecodedRecord::UpdateTileEntity(TileEntityUpdate {
                id: 42,
                removed: true,
                frame: None,
            })
        );
        assert_eq!(registry.lookups.get(), 1);
    }

    #[test]
    fn item_frame_reports_position_and_item() {
        let registry = CountingRegistry::new([(
            7,
            EntityRecord::ItemFrame {
                x: 100,
                y: 200,
                item: Some(ItemStack {
                    item_type: 29,
                    stack: 3,
                }),
            },
        )]);
        let record = decode_outbound(
            layout::UPDATE_TILE_ENTITY,
            &fields(7, 0, 0),
            WorldSize::default(),
            &registry,
        )
        .unwrap();
        let DecodedRecord::UpdateTileEntity(update) = record else {
            panic!("expected tile entity update");
        };
        assert!(!update.removed);
        let frame = update.frame.unwrap();
        assert_eq!(frame.entity_variant_type, layout::TILE_ENTITY_ITEM_FRAME);
        assert_eq!((frame.position_x, frame.position_y), (100, 200));
        assert_eq!(frame.item_type, Some(29));
        assert_eq!(frame.item_stack, Some(3));
        assert_eq!(registry.lookups.get(), 1);
    }

    #[test]
    fn update_tile_entity_id_comes_from_number() {
        let registry = CountingRegistry::new([(
            7,
            EntityRecord::ItemFrame {
                x: 1,
                y: 2,
                item: None,
            },
        )]);
        let fields = OutboundFields {
            number: 9,
            number2: 7,
            number3: 7,
            number4: 7,
            number5: 7,
            ..OutboundFields::default()
        };
        let record =
            decode_outbound(layout::UPDATE_TILE_ENTITY, &fields, WorldSize::default(), &registry)
                .unwrap();
        let DecodedRecord::UpdateTileEntity(update) = record else {
            panic!("expected tile entity update");
        };
        assert_eq!(update.id, 9);
        assert!(update.removed);
        assert!(update.frame.is_none());
    }

    #[test]
    fn empty_item_frame_has_no_item_fields() {
        let registry = CountingRegistry::new([(
            8,
            EntityRecord::ItemFrame {
                x: 1,
                y: 2,
                item: None,
            },
        )]);
        let DecodedRecord::UpdateTileEntity(update) =
            adapt_update_tile_entity(8, &registry).unwrap()
        else {
            panic!("expected tile entity update");
        };
        let frame = update.frame.unwrap();
        assert_eq!(frame.item_type, None);
        assert_eq!(frame.item_stack, None);
    }

    #[test]
    fn other_entity_kinds_are_unsupported() {
        let registry = CountingRegistry::new([(9, EntityRecord::Other { kind: 4, x: 0, y: 0 })]);
        assert_eq!(
            adapt_update_tile_entity(9, &registry).unwrap_err(),
            DecodeError::UnsupportedEntityVariant { id: 9, kind: 4 }
        );
    }

    #[test]
    fn outbound_wire_only_types_have_no_field_decode() {
        let registry = CountingRegistry::empty();
        for tag in [layout::PLACE_OBJECT, layout::PLACE_TILE_ENTITY, layout::ZONES] {
            let err = decode_outbound(
                tag,
                &OutboundFields::default(),
                WorldSize::default(),
                &registry,
            )
            .unwrap_err();
            assert!(err.is_unstructured());
        }
        assert_eq!(registry.lookups.get(), 0);
    }
}
