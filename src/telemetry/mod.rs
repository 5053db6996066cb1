//! Snapshot of the game's local telemetry API for a single poll tick.

mod client;

use serde::Deserialize;
use serde_json::Value;

use crate::map::Fingerprint;
use crate::vehicle::VehicleId;

pub use client::{HttpTelemetry, TelemetrySource, DEFAULT_API_URL};

/// Mission flags reported by `mission.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionStatus {
    pub running: bool,
    pub enabled: bool,
    pub valid: bool,
    pub mission_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MissionPayload {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    is_enabled: Option<bool>,
    #[serde(default)]
    valid: Option<bool>,
    #[serde(default, rename = "type")]
    mission_type: Option<String>,
}

impl MissionStatus {
    pub fn from_json(value: &Value) -> Option<Self> {
        let payload: MissionPayload = serde_json::from_value(value.clone()).ok()?;
        Some(Self {
            running: payload.status.as_deref() == Some("running"),
            enabled: payload.is_enabled.unwrap_or(false),
            valid: payload.valid.unwrap_or(false),
            mission_type: payload.mission_type.filter(|t| !t.is_empty()),
        })
    }

    /// Whether these flags describe an active battle. A missing type counts
    /// as the generic `"mission"` type for the `valid` test.
    pub fn in_mission(&self) -> bool {
        let non_generic_type = self.mission_type.as_deref().unwrap_or("mission") != "mission";
        self.running || self.enabled || (self.valid && non_generic_type)
    }
}

/// Everything the engine reads from the game in one tick. Rebuilt from
/// scratch every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTelemetry {
    /// The state endpoint answered with a JSON object.
    pub online: bool,
    pub vehicle: VehicleId,
    pub mission: Option<MissionStatus>,
    pub map_fingerprint: Option<Fingerprint>,
}

impl RawTelemetry {
    pub fn offline() -> Self {
        Self {
            online: false,
            vehicle: VehicleId::unknown(),
            mission: None,
            map_fingerprint: None,
        }
    }

    /// Assembles a snapshot from whatever each endpoint returned. Any
    /// source may be absent.
    pub fn from_parts(
        state: Option<&Value>,
        indicators: Option<&Value>,
        mission: Option<&Value>,
        map_image: Option<&[u8]>,
    ) -> Self {
        let state = state.filter(|s| s.is_object());

        Self {
            online: state.is_some(),
            vehicle: vehicle_id_from(state, indicators),
            mission: mission.and_then(MissionStatus::from_json),
            map_fingerprint: map_image.and_then(Fingerprint::of_image),
        }
    }

    pub fn in_mission(&self) -> bool {
        self.mission.as_ref().is_some_and(MissionStatus::in_mission)
    }
}

/// `state.name` wins over `indicators.type` when both are present.
fn vehicle_id_from(state: Option<&Value>, indicators: Option<&Value>) -> VehicleId {
    let raw = state
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .or_else(|| indicators.and_then(|i| i.get("type")).and_then(Value::as_str));

    match raw {
        Some(raw) => VehicleId::parse(raw),
        None => VehicleId::unknown(),
    }
}
