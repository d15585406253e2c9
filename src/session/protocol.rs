//! JSON wire protocol for the classification service and admin status feed.
//!
//! The client sends the whole normalized, batched signal as one JSON array
//! of floats. The server answers with messages tagged by `type`; anything
//! with an unknown tag or missing fields is rejected as a protocol error
//! rather than silently ignored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::classify::detection::Detection;
use crate::error::{MozzieError, Result};

/// Classification request type: presence events only, or events plus a
/// species breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Mosquito event detection (`/med`).
    Med,
    /// Mosquito species classification (`/msc`).
    Msc,
}

impl Mode {
    /// URL path of the mode's endpoint on the service.
    pub fn path(self) -> &'static str {
        match self {
            Mode::Med => "/med",
            Mode::Msc => "/msc",
        }
    }

    /// Full endpoint URL on the given service base.
    pub fn endpoint(self, service_url: &str) -> String {
        format!("{}{}", service_url.trim_end_matches('/'), self.path())
    }

    /// Index used for per-mode bookkeeping.
    pub(crate) fn index(self) -> usize {
        match self {
            Mode::Med => 0,
            Mode::Msc => 1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Med => write!(f, "med"),
            Mode::Msc => write!(f, "msc"),
        }
    }
}

impl FromStr for Mode {
    type Err = MozzieError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "med" => Ok(Mode::Med),
            "msc" => Ok(Mode::Msc),
            other => Err(MozzieError::invalid_input(format!(
                "unknown mode '{}' (expected med or msc)",
                other
            ))),
        }
    }
}

/// Serialize the flattened signal into the single request message.
pub fn encode_signal(samples: &[f32]) -> Result<String> {
    serde_json::to_string(samples).map_err(|e| MozzieError::InvalidInput {
        message: format!("Failed to serialize signal: {}", e),
    })
}

/// Messages the service sends during a classification session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Informational only; never a state transition.
    Progress { data: ProgressData },
    /// Terminal success; `data` is mode-specific, see [`ClassifyResult::parse`].
    Complete { data: serde_json::Value },
    /// Terminal failure reported by the service.
    Error { data: ErrorData },
}

impl ServerMessage {
    /// Strict parse of a raw server message.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| MozzieError::Protocol {
            message: format!("Unparseable server message: {}", e),
        })
    }
}

/// Payload of a `progress` message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressData {
    pub message: String,
    /// Percent string such as `"42.00%"`; display only.
    #[serde(default)]
    pub progress: Option<String>,
}

/// Payload of an `error` message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorData {
    pub error: String,
    pub message: String,
}

/// `complete` payload of an event-only (`/med`) session.
///
/// One `[absent, present]` probability pair per frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventPredictions {
    pub predictions: Vec<[f64; 2]>,
}

/// Species half of an event+species (`/msc`) payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeciesDetections {
    pub detected_species: Vec<Detection>,
}

/// `complete` payload of an event+species (`/msc`) session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventsAndSpecies {
    pub events: EventPredictions,
    pub species: SpeciesDetections,
}

/// Parsed terminal result of a classification session.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyResult {
    Events(EventPredictions),
    EventsAndSpecies(EventsAndSpecies),
}

impl ClassifyResult {
    /// Parse a `complete` payload according to the session mode.
    pub fn parse(mode: Mode, data: serde_json::Value) -> Result<Self> {
        match mode {
            Mode::Med => serde_json::from_value(data)
                .map(ClassifyResult::Events)
                .map_err(|e| MozzieError::Protocol {
                    message: format!("Malformed med result: {}", e),
                }),
            Mode::Msc => serde_json::from_value(data)
                .map(ClassifyResult::EventsAndSpecies)
                .map_err(|e| MozzieError::Protocol {
                    message: format!("Malformed msc result: {}", e),
                }),
        }
    }

    /// Per-frame `[absent, present]` pairs, whichever mode produced them.
    pub fn event_predictions(&self) -> &[[f64; 2]] {
        match self {
            ClassifyResult::Events(events) => &events.predictions,
            ClassifyResult::EventsAndSpecies(both) => &both.events.predictions,
        }
    }

    /// Species detections, when the session ran in `msc` mode.
    pub fn detections(&self) -> Option<&[Detection]> {
        match self {
            ClassifyResult::Events(_) => None,
            ClassifyResult::EventsAndSpecies(both) => Some(&both.species.detected_species),
        }
    }
}

/// One full-state snapshot from the admin feed (`/updates`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// The recording currently being processed, if any.
    pub current_recording: Option<CurrentRecording>,
    /// Pending jobs, in queue order.
    #[serde(default)]
    pub queue: Vec<QueueEntry>,
}

impl StatusSnapshot {
    /// Strict parse of a raw feed message.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| MozzieError::Protocol {
            message: format!("Unparseable status snapshot: {}", e),
        })
    }
}

/// The job the service is processing right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRecording {
    pub recording_id: i64,
    pub progress: f64,
    pub status: String,
}

/// A queued job waiting for the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub recording_id: i64,
    #[serde(rename = "type")]
    pub job_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_paths_and_display() {
        assert_eq!(Mode::Med.path(), "/med");
        assert_eq!(Mode::Msc.path(), "/msc");
        assert_eq!(Mode::Med.to_string(), "med");
        assert_eq!(Mode::Msc.to_string(), "msc");
    }

    #[test]
    fn mode_endpoint_joins_without_double_slash() {
        assert_eq!(
            Mode::Med.endpoint("ws://localhost:8000"),
            "ws://localhost:8000/med"
        );
        assert_eq!(
            Mode::Msc.endpoint("wss://classify.example.org/"),
            "wss://classify.example.org/msc"
        );
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("med".parse::<Mode>().unwrap(), Mode::Med);
        assert_eq!("MSC".parse::<Mode>().unwrap(), Mode::Msc);
        assert!("xyz".parse::<Mode>().is_err());
    }

    #[test]
    fn encode_signal_is_a_flat_json_array() {
        let json = encode_signal(&[0.0, 0.5, -1.0]).unwrap();
        assert_eq!(json, "[0.0,0.5,-1.0]");

        let parsed: Vec<f32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn parses_progress_message() {
        let raw = r#"{"type":"progress","data":{"progress":"25.00%","message":"Batch 1 of 4 has been classified."}}"#;
        let message = ServerMessage::from_json(raw).unwrap();

        match message {
            ServerMessage::Progress { data } => {
                assert_eq!(data.message, "Batch 1 of 4 has been classified.");
                assert_eq!(data.progress.as_deref(), Some("25.00%"));
            }
            other => panic!("Expected Progress, got: {:?}", other),
        }
    }

    #[test]
    fn parses_progress_without_percent() {
        let raw = r#"{"type":"progress","data":{"message":"working"}}"#;
        let message = ServerMessage::from_json(raw).unwrap();
        assert!(matches!(message, ServerMessage::Progress { .. }));
    }

    #[test]
    fn parses_error_message() {
        let raw = r#"{"type":"error","data":{"error":"format_error","message":"Invalid JSON"}}"#;
        let message = ServerMessage::from_json(raw).unwrap();

        match message {
            ServerMessage::Error { data } => {
                assert_eq!(data.error, "format_error");
                assert_eq!(data.message, "Invalid JSON");
            }
            other => panic!("Expected Error, got: {:?}", other),
        }
    }

    #[test]
    fn unknown_tag_fails_closed() {
        let raw = r#"{"type":"surprise","data":{}}"#;
        let result = ServerMessage::from_json(raw);
        assert!(matches!(result, Err(MozzieError::Protocol { .. })));
    }

    #[test]
    fn missing_type_fails_closed() {
        let raw = r#"{"data":{"message":"hi"}}"#;
        assert!(ServerMessage::from_json(raw).is_err());
    }

    #[test]
    fn missing_progress_message_field_fails_closed() {
        let raw = r#"{"type":"progress","data":{"progress":"10%"}}"#;
        assert!(ServerMessage::from_json(raw).is_err());
    }

    #[test]
    fn non_json_fails_closed() {
        assert!(ServerMessage::from_json("not json at all").is_err());
    }

    #[test]
    fn parses_med_complete_payload() {
        let raw = r#"{"type":"complete","data":{"predictions":[[0.9,0.1],[0.2,0.8]]}}"#;
        let message = ServerMessage::from_json(raw).unwrap();

        let ServerMessage::Complete { data } = message else {
            panic!("Expected Complete");
        };
        let result = ClassifyResult::parse(Mode::Med, data).unwrap();

        assert_eq!(result.event_predictions(), &[[0.9, 0.1], [0.2, 0.8]]);
        assert!(result.detections().is_none());
    }

    #[test]
    fn parses_msc_complete_payload() {
        let raw = r#"{
            "type": "complete",
            "data": {
                "events": {"predictions": [[0.3, 0.7]]},
                "species": {"detected_species": [
                    {"start": 0.0, "end": 1.92, "species": "an arabiensis",
                     "predictions": {"an arabiensis": 0.81, "culex pipiens": 0.12}}
                ]}
            }
        }"#;
        let message = ServerMessage::from_json(raw).unwrap();

        let ServerMessage::Complete { data } = message else {
            panic!("Expected Complete");
        };
        let result = ClassifyResult::parse(Mode::Msc, data).unwrap();

        assert_eq!(result.event_predictions(), &[[0.3, 0.7]]);
        let detections = result.detections().unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].species, "an arabiensis");
    }

    #[test]
    fn med_payload_under_msc_mode_is_a_protocol_error() {
        let data: serde_json::Value =
            serde_json::from_str(r#"{"predictions":[[0.9,0.1]]}"#).unwrap();
        let result = ClassifyResult::parse(Mode::Msc, data);
        assert!(matches!(result, Err(MozzieError::Protocol { .. })));
    }

    #[test]
    fn msc_payload_under_med_mode_is_a_protocol_error() {
        let data: serde_json::Value = serde_json::from_str(
            r#"{"events":{"predictions":[]},"species":{"detected_species":[]}}"#,
        )
        .unwrap();
        let result = ClassifyResult::parse(Mode::Med, data);
        assert!(matches!(result, Err(MozzieError::Protocol { .. })));
    }

    #[test]
    fn parses_status_snapshot_with_current_recording() {
        let raw = r#"{
            "current_recording": {"recording_id": 1234, "progress": 40.0, "status": "Processing"},
            "queue": [{"recording_id": 1235, "type": "med"}, {"recording_id": 1236, "type": "msc"}]
        }"#;
        let snapshot = StatusSnapshot::from_json(raw).unwrap();

        let current = snapshot.current_recording.unwrap();
        assert_eq!(current.recording_id, 1234);
        assert_eq!(current.progress, 40.0);
        assert_eq!(current.status, "Processing");

        assert_eq!(snapshot.queue.len(), 2);
        assert_eq!(snapshot.queue[0].recording_id, 1235);
        assert_eq!(snapshot.queue[0].job_type, "med");
    }

    #[test]
    fn parses_status_snapshot_idle() {
        let raw = r#"{"current_recording": null, "queue": []}"#;
        let snapshot = StatusSnapshot::from_json(raw).unwrap();

        assert!(snapshot.current_recording.is_none());
        assert!(snapshot.queue.is_empty());
    }

    #[test]
    fn malformed_snapshot_is_a_protocol_error() {
        let result = StatusSnapshot::from_json(r#"{"queue": "nope"}"#);
        assert!(matches!(result, Err(MozzieError::Protocol { .. })));
    }
}
