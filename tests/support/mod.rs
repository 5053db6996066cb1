#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use wt_presence::map::{Fingerprint, MapIdentifier, MapTable, DEFAULT_MAP_IMAGE_BASE_URL};
use wt_presence::presence::{MapTableStore, PresenceEngine, PresenceSink, PresentationState};
use wt_presence::telemetry::{MissionStatus, RawTelemetry, TelemetrySource};
use wt_presence::vehicle::{LookupResult, VehicleId, VehicleLookup, VehicleResolver};

/// Plays back a fixed list of snapshots, then keeps repeating the last one.
#[derive(Clone, Default)]
pub struct ScriptedTelemetry {
    inner: Arc<ScriptInner>,
}

#[derive(Default)]
struct ScriptInner {
    script: Mutex<VecDeque<RawTelemetry>>,
    last: Mutex<Option<RawTelemetry>>,
    polls: AtomicUsize,
    exhausted: Notify,
}

impl ScriptedTelemetry {
    pub fn new(snapshots: impl IntoIterator<Item = RawTelemetry>) -> Self {
        let script = Self::default();
        script.inner.script.lock().unwrap().extend(snapshots);
        script
    }

    pub fn polls(&self) -> usize {
        self.inner.polls.load(Ordering::SeqCst)
    }

    /// Resolves once every scripted snapshot has been handed out.
    pub async fn exhausted(&self) {
        self.inner.exhausted.notified().await
    }
}

impl TelemetrySource for ScriptedTelemetry {
    async fn poll(&self) -> RawTelemetry {
        self.inner.polls.fetch_add(1, Ordering::SeqCst);

        let (next, now_empty) = {
            let mut script = self.inner.script.lock().unwrap();
            let next = script.pop_front();
            (next, script.is_empty())
        };

        match next {
            Some(snapshot) => {
                *self.inner.last.lock().unwrap() = Some(snapshot.clone());
                if now_empty {
                    self.inner.exhausted.notify_one();
                }
                snapshot
            }
            None => self
                .inner
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(RawTelemetry::offline),
        }
    }
}

/// Answers every lookup from a fixed table and counts calls.
#[derive(Clone, Default)]
pub struct TableLookup {
    pub answers: Arc<Mutex<Vec<(String, LookupResult)>>>,
    pub calls: Arc<AtomicUsize>,
}

impl TableLookup {
    pub fn with(id: &str, name: &str, rating: Option<&str>) -> Self {
        let lookup = Self::default();
        lookup.answers.lock().unwrap().push((
            id.to_string(),
            LookupResult {
                display_name: name.to_string(),
                rating: rating.map(str::to_string),
            },
        ));
        lookup
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VehicleLookup for TableLookup {
    async fn lookup(&self, canonical_id: &str) -> Option<LookupResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == canonical_id)
            .map(|(_, result)| result.clone())
    }
}

/// Records every published state.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub published: Arc<Mutex<Vec<PresentationState>>>,
    pub shutdowns: Arc<AtomicUsize>,
}

impl RecordingSink {
    pub fn published(&self) -> Vec<PresentationState> {
        self.published.lock().unwrap().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl PresenceSink for RecordingSink {
    fn name(&self) -> &'static str {
        "Recording"
    }

    fn publish(&self, state: &PresentationState) {
        self.published.lock().unwrap().push(state.clone());
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts map table saves and keeps the last saved table.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub saved: Arc<Mutex<Vec<MapTable>>>,
}

impl MapTableStore for MemoryStore {
    fn save_map_table(&self, table: &MapTable) -> wt_presence::Result<()> {
        self.saved.lock().unwrap().push(table.clone());
        Ok(())
    }
}

/// Panics on the `panic_on`-th poll (zero based), otherwise defers to
/// the wrapped script.
pub struct FaultyTelemetry {
    pub script: ScriptedTelemetry,
    pub panic_on: usize,
    calls: AtomicUsize,
}

impl FaultyTelemetry {
    pub fn new(script: ScriptedTelemetry, panic_on: usize) -> Self {
        Self {
            script,
            panic_on,
            calls: AtomicUsize::new(0),
        }
    }
}

impl TelemetrySource for FaultyTelemetry {
    async fn poll(&self) -> RawTelemetry {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.panic_on {
            panic!("telemetry source blew up");
        }
        self.script.poll().await
    }
}

/// Clock that advances by one second on every reading.
pub fn ticking_clock(start: i64) -> Box<dyn Fn() -> i64 + Send + Sync> {
    let now = AtomicI64::new(start);
    Box::new(move || now.fetch_add(1, Ordering::SeqCst))
}

pub fn engine<T: TelemetrySource>(
    telemetry: T,
    lookup: TableLookup,
    maps: MapTable,
) -> PresenceEngine<T, TableLookup> {
    PresenceEngine::with_clock(
        telemetry,
        VehicleResolver::new(lookup, Default::default()),
        MapIdentifier::new(maps, DEFAULT_MAP_IMAGE_BASE_URL),
        ticking_clock(1_000),
    )
}

pub fn snapshot(
    vehicle: &str,
    mission: Option<MissionStatus>,
    map: Option<&[u8]>,
) -> RawTelemetry {
    RawTelemetry {
        online: true,
        vehicle: VehicleId::parse(vehicle),
        mission,
        map_fingerprint: map.and_then(Fingerprint::of_image),
    }
}

pub fn hangar(vehicle: &str) -> RawTelemetry {
    RawTelemetry {
        online: true,
        vehicle: VehicleId::parse(vehicle),
        mission: None,
        map_fingerprint: Some(Fingerprint::from_hex(
            wt_presence::map::HANGAR_FINGERPRINT,
        )),
    }
}

pub fn running() -> Option<MissionStatus> {
    Some(MissionStatus {
        running: true,
        ..Default::default()
    })
}
