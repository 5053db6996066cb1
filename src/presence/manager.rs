//! Drives the presence engine on a fixed interval and forwards changes to a sink

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::engine::{PresenceEngine, TickOutcome};
use super::traits::{MapTableStore, PresenceSink};
use crate::error::Result;
use crate::telemetry::TelemetrySource;
use crate::vehicle::VehicleLookup;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// Owns the background polling task. At most one task runs per poller.
pub struct Poller {
    interval: Duration,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            stop_tx: None,
            task: None,
        }
    }

    pub fn state(&self) -> PollerState {
        match &self.task {
            Some(task) if !task.is_finished() => PollerState::Polling,
            _ => PollerState::Idle,
        }
    }

    /// Connects the sink and starts ticking.
    ///
    /// A sink connection failure is returned to the caller and the poller
    /// stays idle. Starting an already running poller is a no-op.
    pub async fn start<T, L, S, C>(
        &mut self,
        engine: PresenceEngine<T, L>,
        connect: C,
        store: Option<Box<dyn MapTableStore>>,
    ) -> Result<()>
    where
        T: TelemetrySource + 'static,
        L: VehicleLookup + 'static,
        S: PresenceSink + 'static,
        C: Future<Output = Result<S>>,
    {
        if self.state() == PollerState::Polling {
            tracing::warn!("Presence polling is already running");
            return Ok(());
        }

        let sink = connect.await.inspect_err(|e| {
            tracing::error!("Failed to connect presence sink: {}", e);
        })?;
        tracing::info!(
            "Starting presence polling every {:?} via {}",
            self.interval,
            sink.name()
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        self.stop_tx = Some(stop_tx);
        self.task = Some(tokio::spawn(run_poll_loop(
            engine,
            sink,
            store,
            self.interval,
            stop_rx,
        )));

        Ok(())
    }

    /// Signals the loop to stop and waits for the tick in flight and the
    /// sink teardown to finish.
    pub async fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Presence polling task failed: {}", e);
            }
            tracing::info!("Presence polling stopped");
        }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

async fn run_poll_loop<T, L, S>(
    mut engine: PresenceEngine<T, L>,
    sink: S,
    store: Option<Box<dyn MapTableStore>>,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) where
    T: TelemetrySource,
    L: VehicleLookup,
    S: PresenceSink,
{
    loop {
        if *stop_rx.borrow() {
            break;
        }

        let outcome = match CatchPanic(Box::pin(engine.tick())).await {
            Ok(outcome) => Some(outcome),
            Err(payload) => {
                tracing::error!("Presence tick panicked: {}", panic_message(&*payload));
                None
            }
        };

        if let Some(outcome) = outcome {
            handle_outcome(&engine, &sink, store.as_deref(), outcome);
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    sink.shutdown().await;
    tracing::info!("{} presence cleared", sink.name());
}

fn handle_outcome<T, L, S>(
    engine: &PresenceEngine<T, L>,
    sink: &S,
    store: Option<&dyn MapTableStore>,
    outcome: TickOutcome,
) where
    T: TelemetrySource,
    L: VehicleLookup,
    S: PresenceSink,
{
    if outcome.registered_map {
        if let Some(store) = store {
            if let Err(e) = store.save_map_table(engine.map_table()) {
                tracing::error!("Failed to persist map table: {}", e);
            }
        }
    }

    if outcome.changed {
        tracing::info!(
            "Presence update: {} | {}",
            outcome.state.headline,
            outcome.state.subline
        );
        sink.publish(&outcome.state);
    }
}

/// Resolves to `Err` with the panic payload if polling the inner future
/// panics.
struct CatchPanic<F>(Pin<Box<F>>);

impl<F: Future> Future for CatchPanic<F> {
    type Output = std::thread::Result<F::Output>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = &mut self.0;
        match panic::catch_unwind(AssertUnwindSafe(|| inner.as_mut().poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Err(payload) => Poll::Ready(Err(payload)),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
