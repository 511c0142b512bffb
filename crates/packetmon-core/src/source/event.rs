use serde::{Deserialize, Serialize};

use crate::outbound::fields::OutboundFields;
use crate::outbound::registry::EntityRecord;
use crate::protocol::error::DecodeError;
use crate::protocol::view::RawPacketView;

/// One observation handed to the monitor.
///
/// State events keep the collaborator tables (players, tile entities, world
/// size) current; packet events are classified and decoded.
///
/// # Examples
/// ```
/// use packetmon_core::MonitorEvent;
///
/// let line = r#"{"event":"recv","tag":17,"client":0,"buffer":[2,100,0,200,0,1,0,0]}"#;
/// let event: MonitorEvent = serde_json::from_str(line).unwrap();
/// assert!(matches!(event, MonitorEvent::Recv(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    World { width: i32, height: i32 },
    Join { client: i32, name: String },
    Leave { client: i32 },
    TileEntitySet { id: i32, entity: EntityRecord },
    TileEntityRemove { id: i32 },
    /// Client-to-server message as wire bytes.
    Recv(WireMessage),
    /// Server broadcast as typed send parameters.
    Send(Broadcast),
    /// Server-to-client message as wire bytes (captures).
    SendRaw(WireMessage),
}

/// A message available as wire bytes inside a buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Capture time in seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
    pub tag: u8,
    /// Sender for inbound messages, receiver for outbound ones.
    pub client: i32,
    pub buffer: Vec<u8>,
    #[serde(default)]
    pub offset: usize,
    /// Payload length; the rest of the buffer when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl WireMessage {
    pub fn view(&self) -> Result<RawPacketView<'_>, DecodeError> {
        let length = self
            .length
            .unwrap_or_else(|| self.buffer.len().saturating_sub(self.offset));
        RawPacketView::new(self.tag, &self.buffer, self.offset, length)
    }
}

/// A server broadcast described by its send parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
    pub tag: u8,
    #[serde(default)]
    pub fields: OutboundFields,
}

impl MonitorEvent {
    pub fn ts(&self) -> Option<f64> {
        match self {
            MonitorEvent::Recv(message) | MonitorEvent::SendRaw(message) => message.ts,
            MonitorEvent::Send(broadcast) => broadcast.ts,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_message_defaults_to_whole_buffer() {
        let message = WireMessage {
            ts: None,
            tag: 87,
            client: 1,
            buffer: vec![0xaa, 1, 0, 2, 0, 3],
            offset: 1,
            length: None,
        };
        let view = message.view().unwrap();
        assert_eq!(view.bytes(), &[1, 0, 2, 0, 3]);
    }

    #[test]
    fn wire_message_rejects_bad_window() {
        let message = WireMessage {
            ts: None,
            tag: 87,
            client: 1,
            buffer: vec![0u8; 4],
            offset: 2,
            length: Some(5),
        };
        assert!(matches!(
            message.view(),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn send_event_parses_fields() {
        let line = r#"{"event":"send","ts":1.5,"tag":20,"fields":{"number":3,"number2":10,"remote_client":2}}"#;
        let event: MonitorEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.ts(), Some(1.5));
        let MonitorEvent::Send(broadcast) = event else {
            panic!("expected send event");
        };
        assert_eq!(broadcast.fields.number, 3);
        assert_eq!(broadcast.fields.remote_client, 2);
        assert_eq!(broadcast.fields.ignore_client, -1);
    }

    #[test]
    fn state_events_parse() {
        let event: MonitorEvent =
            serde_json::from_str(r#"{"event":"join","client":3,"name":"Ada"}"#).unwrap();
        assert_eq!(
            event,
            MonitorEvent::Join {
                client: 3,
                name: "Ada".to_string()
            }
        );
        let event: MonitorEvent = serde_json::from_str(
            r#"{"event":"tile_entity_set","id":1,"entity":{"variant":"other","kind":0,"x":1,"y":2}}"#,
        )
        .unwrap();
        assert!(matches!(event, MonitorEvent::TileEntitySet { id: 1, .. }));
    }
}
