use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::protocol::classify::{Direction, NoiseClass, packet_name};
use crate::protocol::error::DecodeError;
use crate::protocol::record::DecodedRecord;

use super::players::PlayerDirectory;

const MISSING: &str = "-";

/// Who a packet event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Peers {
    /// Sender of an inbound message or receiver of a captured outbound one.
    Client(i32),
    Broadcast { ignore: i32, remote: i32 },
}

/// RFC 3339 rendering of a Unix timestamp, `-` when absent or out of range.
///
/// # Examples
/// ```
/// use packetmon_core::format_ts;
///
/// assert_eq!(format_ts(Some(1_700_000_000.0)), "2023-11-14T22:13:20Z");
/// assert_eq!(format_ts(None), "-");
/// ```
pub fn format_ts(ts: Option<f64>) -> String {
    ts.and_then(rfc3339).unwrap_or_else(|| MISSING.to_string())
}

fn rfc3339(ts: f64) -> Option<String> {
    let micros = (ts * 1_000_000.0).round() as i128;
    let nanos = micros.checked_mul(1_000)?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

pub(crate) fn seen_line(
    ts: &str,
    direction: Direction,
    tag: u8,
    peers: Peers,
    players: &PlayerDirectory,
) -> String {
    let head = format!("{ts}: [{}] {tag} ({})", direction.label(), packet_name(tag));
    match (peers, direction) {
        (Peers::Client(client), Direction::Inbound) => {
            format!("{head} from: {client} ({})", players.label(client))
        }
        (Peers::Client(client), Direction::Outbound) => {
            format!("{head} to: {client} ({})", players.label(client))
        }
        (Peers::Broadcast { ignore, remote }, _) => format!(
            "{head} ign: {ignore} ({}) | rem: {remote} ({})",
            players.label(ignore),
            players.label(remote)
        ),
    }
}

pub(crate) fn record_line(ts: &str, direction: Direction, record: &DecodedRecord) -> String {
    let label = direction.label();
    match record {
        DecodedRecord::PlaceTileEntity(entity) => format!(
            "{ts}: \t\t[{label}] TEpl @ ({}, {}), type: {}",
            entity.x, entity.y, entity.entity_kind
        ),
        DecodedRecord::PlaceObject(object) => format!(
            "{ts}: \t\t[{label}] OBJpl @ ({}, {}), type: {}, style: {}",
            object.x, object.y, object.object_type, object.style
        ),
        DecodedRecord::Tile(edit) => format!(
            "{ts}: \t\t [{label}] Tile Edit @ ({}, {}), action: {}, var1: {}, var2: {}, fail: {}",
            edit.x, edit.y, edit.action, edit.var1, edit.var2, edit.fail
        ),
        DecodedRecord::TileSendSquare(square) => format!(
            "{ts}: \t\t[{label}] TSqr @ ({}, {}), size: {}, header: 0x{:04X}, changeType: {}",
            square.x,
            square.y,
            square.size,
            square.header,
            square
                .change_type
                .map_or_else(|| MISSING.to_string(), |value| value.to_string())
        ),
        DecodedRecord::TileSquareBroadcast(square) => format!(
            "{ts}: \t\t[{label}] TSqr @ ({}, {}), size: {}, masked: 0x{:04X}, flagged: 0x{:04X}, changeType: {}",
            square.tile_x,
            square.tile_y,
            square.size,
            square.masked_size,
            square.masked_size_with_flag,
            square.has_change_type
        ),
        DecodedRecord::UpdateTileEntity(update) => {
            let mut line = format!(
                "{ts}: \t\t[{label}] TEupd. Entity ID: {}. Remove entity: {}.",
                update.id, update.removed
            );
            if let Some(frame) = update.frame {
                line.push_str(&format!(
                    "\n\t\t  Type: {}. Position: ({}, {})",
                    frame.entity_variant_type, frame.position_x, frame.position_y
                ));
                line.push_str(&format!(
                    "\n\t\t  Item details: Type: {}. Stack: {}",
                    optional(frame.item_type),
                    optional(frame.item_stack)
                ));
            }
            line
        }
    }
}

pub(crate) fn failure_line(ts: &str, direction: Direction, tag: u8, err: &DecodeError) -> String {
    format!(
        "{ts}: \t\t[{}] {tag} ({}) decode failed: {err}",
        direction.label(),
        packet_name(tag)
    )
}

fn optional(value: Option<i32>) -> String {
    value.map_or_else(|| MISSING.to_string(), |value| value.to_string())
}

/// One `--json` output object.
#[derive(Debug, Serialize)]
pub(crate) struct JsonLine<'a> {
    pub ts: Option<String>,
    pub direction: Direction,
    pub tag: u8,
    pub packet: &'static str,
    pub noise: NoiseClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_client: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_client: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<&'a DecodedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> JsonLine<'a> {
    pub(crate) fn new(
        ts: Option<f64>,
        direction: Direction,
        tag: u8,
        noise: NoiseClass,
        peers: Peers,
        players: &'a PlayerDirectory,
    ) -> Self {
        let mut line = Self {
            ts: ts.and_then(rfc3339),
            direction,
            tag,
            packet: packet_name(tag),
            noise,
            client: None,
            client_name: None,
            ignore_client: None,
            ignore_name: None,
            remote_client: None,
            remote_name: None,
            record: None,
            error: None,
        };
        match peers {
            Peers::Client(client) => {
                line.client = Some(client);
                line.client_name = players.name(client);
            }
            Peers::Broadcast { ignore, remote } => {
                line.ignore_client = Some(ignore);
                line.ignore_name = players.name(ignore);
                line.remote_client = Some(remote);
                line.remote_name = players.name(remote);
            }
        }
        line
    }
}
