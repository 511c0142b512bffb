//! Packet classification: noise suppression and decoder selection.
//!
//! The noise tables are `const` data so classification is a pure lookup and
//! needs no synchronisation. Classification only decides whether the generic
//! "packet seen" line is emitted; structured decodes run whenever a decoder
//! exists for the tag.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::layout;

/// Which way a packet travels relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to server.
    Inbound,
    /// Server to client.
    Outbound,
}

impl Direction {
    /// Short label used in text output.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Inbound => "Recv",
            Direction::Outbound => "Send",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseClass {
    Routine,
    Suppressed,
}

/// Set of high-frequency packet types treated as noise.
///
/// `Classic` covers position, health, NPC chatter, projectile and zone sync
/// (plus NPC updates and item drops outbound). `Refined` also silences tile
/// square sync in both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseProfile {
    Classic,
    #[default]
    Refined,
}

const CLASSIC_INBOUND: &[u8] = &[
    layout::PLAYER_UPDATE,
    layout::PLAYER_HP,
    layout::NPC_TALK,
    layout::PROJECTILE_DESTROY,
    layout::PROJECTILE_NEW,
    layout::ZONES,
];

const CLASSIC_OUTBOUND: &[u8] = &[
    layout::PLAYER_UPDATE,
    layout::PLAYER_HP,
    layout::NPC_TALK,
    layout::PROJECTILE_DESTROY,
    layout::PROJECTILE_NEW,
    layout::NPC_UPDATE,
    layout::ZONES,
    layout::ITEM_DROP,
];

const REFINED_INBOUND: &[u8] = &[
    layout::PLAYER_UPDATE,
    layout::PLAYER_HP,
    layout::NPC_TALK,
    layout::PROJECTILE_DESTROY,
    layout::PROJECTILE_NEW,
    layout::ZONES,
    layout::TILE_SEND_SQUARE,
];

const REFINED_OUTBOUND: &[u8] = &[
    layout::PLAYER_UPDATE,
    layout::PLAYER_HP,
    layout::NPC_TALK,
    layout::PROJECTILE_DESTROY,
    layout::PROJECTILE_NEW,
    layout::NPC_UPDATE,
    layout::ZONES,
    layout::ITEM_DROP,
    layout::TILE_SEND_SQUARE,
];

impl NoiseProfile {
    pub fn noisy_tags(self, direction: Direction) -> &'static [u8] {
        match (self, direction) {
            (NoiseProfile::Classic, Direction::Inbound) => CLASSIC_INBOUND,
            (NoiseProfile::Classic, Direction::Outbound) => CLASSIC_OUTBOUND,
            (NoiseProfile::Refined, Direction::Inbound) => REFINED_INBOUND,
            (NoiseProfile::Refined, Direction::Outbound) => REFINED_OUTBOUND,
        }
    }

    pub fn classify(self, tag: u8, direction: Direction) -> NoiseClass {
        if self.noisy_tags(direction).contains(&tag) {
            NoiseClass::Suppressed
        } else {
            NoiseClass::Routine
        }
    }
}

/// Classify a tag with the default (refined) noise profile.
///
/// # Examples
/// ```
/// use packetmon_core::{Direction, NoiseClass, classify};
///
/// assert_eq!(classify(13, Direction::Inbound), NoiseClass::Suppressed);
/// assert_eq!(classify(17, Direction::Inbound), NoiseClass::Routine);
/// assert_eq!(classify(250, Direction::Outbound), NoiseClass::Routine);
/// ```
pub fn classify(tag: u8, direction: Direction) -> NoiseClass {
    NoiseProfile::default().classify(tag, direction)
}

/// Structured decoders available in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderKind {
    PlaceTileEntity,
    PlaceObject,
    Tile,
    TileSendSquare,
    UpdateTileEntity,
}

impl DecoderKind {
    /// Decoder for a message available as raw wire bytes.
    pub fn for_wire_tag(tag: u8) -> Option<DecoderKind> {
        match tag {
            layout::PLACE_TILE_ENTITY => Some(DecoderKind::PlaceTileEntity),
            layout::PLACE_OBJECT => Some(DecoderKind::PlaceObject),
            layout::TILE => Some(DecoderKind::Tile),
            layout::TILE_SEND_SQUARE => Some(DecoderKind::TileSendSquare),
            _ => None,
        }
    }

    /// Decoder for a message available as pre-parsed broadcast fields.
    pub fn for_field_tag(tag: u8) -> Option<DecoderKind> {
        match tag {
            layout::UPDATE_TILE_ENTITY => Some(DecoderKind::UpdateTileEntity),
            layout::TILE => Some(DecoderKind::Tile),
            layout::TILE_SEND_SQUARE => Some(DecoderKind::TileSendSquare),
            _ => None,
        }
    }
}

/// Decoder a hook event of the given direction maps to.
///
/// Inbound hook events carry wire bytes; outbound hook events carry the
/// server's broadcast fields.
pub fn decoder_for(tag: u8, direction: Direction) -> Option<DecoderKind> {
    match direction {
        Direction::Inbound => DecoderKind::for_wire_tag(tag),
        Direction::Outbound => DecoderKind::for_field_tag(tag),
    }
}

/// Protocol name for a packet tag (`Unknown` when unmapped).
///
/// # Examples
/// ```
/// use packetmon_core::packet_name;
///
/// assert_eq!(packet_name(17), "Tile");
/// assert_eq!(packet_name(0), "Unknown");
/// assert_eq!(packet_name(255), "Unknown");
/// ```
pub fn packet_name(tag: u8) -> &'static str {
    layout::PACKET_NAMES
        .get(tag as usize)
        .copied()
        .unwrap_or(layout::PACKET_NAMES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_drop_is_noise_only_outbound() {
        assert_eq!(
            classify(layout::ITEM_DROP, Direction::Inbound),
            NoiseClass::Routine
        );
        assert_eq!(
            classify(layout::ITEM_DROP, Direction::Outbound),
            NoiseClass::Suppressed
        );
    }

    #[test]
    fn tile_square_is_noise_only_in_refined_profile() {
        for direction in [Direction::Inbound, Direction::Outbound] {
            assert_eq!(
                NoiseProfile::Classic.classify(layout::TILE_SEND_SQUARE, direction),
                NoiseClass::Routine
            );
            assert_eq!(
                NoiseProfile::Refined.classify(layout::TILE_SEND_SQUARE, direction),
                NoiseClass::Suppressed
            );
        }
    }

    #[test]
    fn refined_tables_extend_classic_tables() {
        for direction in [Direction::Inbound, Direction::Outbound] {
            let refined = NoiseProfile::Refined.noisy_tags(direction);
            for tag in NoiseProfile::Classic.noisy_tags(direction) {
                assert!(refined.contains(tag), "tag {tag} missing ({direction})");
            }
        }
    }

    #[test]
    fn unknown_tags_are_routine() {
        for tag in [0u8, 141, 200, 255] {
            assert_eq!(classify(tag, Direction::Inbound), NoiseClass::Routine);
            assert_eq!(classify(tag, Direction::Outbound), NoiseClass::Routine);
        }
    }

    #[test]
    fn decoder_selection_depends_on_direction() {
        assert_eq!(
            decoder_for(layout::PLACE_OBJECT, Direction::Inbound),
            Some(DecoderKind::PlaceObject)
        );
        assert_eq!(decoder_for(layout::PLACE_OBJECT, Direction::Outbound), None);
        assert_eq!(decoder_for(layout::UPDATE_TILE_ENTITY, Direction::Inbound), None);
        assert_eq!(
            decoder_for(layout::UPDATE_TILE_ENTITY, Direction::Outbound),
            Some(DecoderKind::UpdateTileEntity)
        );
        assert_eq!(
            decoder_for(layout::TILE, Direction::Outbound),
            Some(DecoderKind::Tile)
        );
    }

    #[test]
    fn names_follow_tag_table() {
        assert_eq!(packet_name(layout::PLACE_TILE_ENTITY), "PlaceTileEntity");
        assert_eq!(packet_name(layout::UPDATE_TILE_ENTITY), "UpdateTileEntity");
        assert_eq!(packet_name(layout::ZONES), "Zones");
        assert_eq!(packet_name(140), "SetMiscEventValues");
        assert_eq!(packet_name(141), "Unknown");
    }
}
