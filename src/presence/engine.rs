//! One poll tick: gather telemetry, resolve vehicle and map, classify and
//! gate the result.

use crate::map::{MapDisplay, MapIdentifier, MapTable};
use crate::telemetry::TelemetrySource;
use crate::vehicle::{VehicleLookup, VehicleResolver};

use super::classifier::classify;
use super::gate::ChangeGate;
use super::PresentationState;

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Result of a single tick
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub state: PresentationState,
    /// The state differs from the last published one and must be sent.
    pub changed: bool,
    /// A new map fingerprint was added to the table this tick.
    pub registered_map: bool,
}

/// Owns all state that lives across ticks: the vehicle cache, the map
/// table, the session start and the last published state.
pub struct PresenceEngine<T, L> {
    telemetry: T,
    vehicles: VehicleResolver<L>,
    maps: MapIdentifier,
    gate: ChangeGate,
    session_start: i64,
    in_hangar: bool,
    clock: Clock,
}

impl<T: TelemetrySource, L: VehicleLookup> PresenceEngine<T, L> {
    pub fn new(telemetry: T, vehicles: VehicleResolver<L>, maps: MapIdentifier) -> Self {
        Self::with_clock(telemetry, vehicles, maps, Box::new(|| chrono::Utc::now().timestamp()))
    }

    pub fn with_clock(
        telemetry: T,
        vehicles: VehicleResolver<L>,
        maps: MapIdentifier,
        clock: Clock,
    ) -> Self {
        let session_start = clock();
        Self {
            telemetry,
            vehicles,
            maps,
            gate: ChangeGate::new(),
            session_start,
            in_hangar: false,
            clock,
        }
    }

    pub async fn tick(&mut self) -> TickOutcome {
        let telemetry = self.telemetry.poll().await;
        let vehicle = self.vehicles.resolve(&telemetry.vehicle).await;
        let map = self.maps.identify(telemetry.map_fingerprint.as_ref());
        let display = MapDisplay::from(&map.value);

        // The session clock restarts each time the player returns to the
        // hangar, whether by the built-in fingerprint or a table entry.
        let in_hangar = display.is_hangar();
        if in_hangar && !self.in_hangar {
            self.session_start = (self.clock)();
            tracing::debug!("Entered hangar, session start reset to {}", self.session_start);
        }
        self.in_hangar = in_hangar;

        let state = classify(&telemetry, &vehicle, &display, self.session_start);
        let changed = self.gate.admit(&state);

        let map_name = &display.name;
        tracing::debug!(
            online = telemetry.online,
            vehicle = telemetry.vehicle.canonical(),
            map = %map_name,
            changed,
            "Tick: {} | {}",
            state.headline,
            state.subline
        );

        TickOutcome {
            state,
            changed,
            registered_map: map.newly_registered,
        }
    }

    pub fn map_table(&self) -> &MapTable {
        self.maps.table()
    }

    pub fn session_start(&self) -> i64 {
        self.session_start
    }

    pub fn last_published(&self) -> Option<&PresentationState> {
        self.gate.last_published()
    }
}
