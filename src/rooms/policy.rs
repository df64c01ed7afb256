use serde_json::{Value, json};

use crate::shared_types::RoomId;

// -----------------------------------------------------------------------------
// ----- RoomPolicy ------------------------------------------------------------

/// Fixed defaults sent with every video-room `create` request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomPolicy {
    pub publishers: u32,
    pub bitrate: u64,
    pub bitrate_cap: bool,
    pub video_codec: String,
    pub audio_codec: String,
    pub record: bool,
    pub rec_dir: String,
    pub transport_wide_cc: bool,
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self {
            publishers: 2,
            bitrate: 1_000_000,
            bitrate_cap: true,
            video_codec: "h264,vp8".to_string(),
            audio_codec: "opus".to_string(),
            record: false,
            rec_dir: "./recordings".to_string(),
            transport_wide_cc: true,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- RoomPolicy: Public ----------------------------------------------------

impl RoomPolicy {
    /// Plugin body for creating `room`. Caller supplied description and
    /// publisher cap win over the defaults.
    pub fn create_request(
        &self,
        room: RoomId,
        description: Option<&str>,
        max_publishers: Option<u32>,
    ) -> Value {
        let description = description
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Face Auth Room {room}"));

        json!({
            "request": "create",
            "room": room.0,
            "description": description,
            "publishers": max_publishers.unwrap_or(self.publishers),
            "bitrate": self.bitrate,
            "bitrate_cap": self.bitrate_cap,
            "videocodec": self.video_codec,
            "audiocodec": self.audio_codec,
            "record": self.record,
            "rec_dir": self.rec_dir,
            "transport_wide_cc_ext": self.transport_wide_cc,
        })
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------


// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
