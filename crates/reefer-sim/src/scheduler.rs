//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Tick loop and delivery driver."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, info_span, warn, Instrument};

use crate::actuator::{decide, humidity_alert, ActuatorSignal, HUMIDITY_LIMIT_PCT};
use crate::delivery::{DeliveryController, DeliveryStatus};
use crate::errors::SimulationError;
use crate::frames::SensorState;
use crate::generator::SensorSource;
use crate::publisher::TelemetrySink;

/// Outcome of one executed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub state: SensorState,
    pub signal: ActuatorSignal,
    pub humidity_alert: bool,
    pub published: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub publish_failures: u64,
    /// Report of the final executed tick.
    pub last: Option<TickReport>,
}

/// Drives the advance → publish → actuate cycle while the delivery runs.
pub struct TickScheduler<S> {
    source: S,
    sink: Arc<dyn TelemetrySink>,
    interval: Duration,
}

impl<S: SensorSource> TickScheduler<S> {
    pub fn new(source: S, sink: Arc<dyn TelemetrySink>, interval: Duration) -> Self {
        Self {
            source,
            sink,
            interval,
        }
    }

    /// Run until `status` leaves [`DeliveryStatus::Running`].
    ///
    /// The status is checked before every tick and watched during the wait,
    /// so a stop never starts another tick; a tick already in flight runs to
    /// completion. A dropped controller counts as a stop.
    pub async fn run(mut self, mut status: watch::Receiver<DeliveryStatus>) -> RunSummary {
        let mut state = self.source.initialize();
        info!(temperature = state.temperature, humidity = state.humidity, "initial reading");

        let mut summary = RunSummary::default();
        loop {
            let running = status.borrow_and_update().is_running();
            if !running {
                break;
            }

            let tick = summary.ticks + 1;
            let report = self
                .tick(tick, &mut state)
                .instrument(info_span!("tick", tick))
                .await;
            summary.ticks = tick;
            if !report.published {
                summary.publish_failures += 1;
            }
            summary.last = Some(report);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = status.changed() => {
                    if changed.is_err() {
                        warn!("delivery controller dropped, stopping tick loop");
                        break;
                    }
                }
            }
        }
        summary
    }

    async fn tick(&mut self, tick: u64, state: &mut SensorState) -> TickReport {
        self.source.advance(state);
        info!(
            temperature = state.temperature,
            humidity = state.humidity,
            "sensor reading: {}",
            state
        );

        let published = match self.sink.publish(&state.payload()).await {
            Ok(()) => {
                info!(
                    "telemetry sent: temperature={:.2} °C, humidity={:.2} %",
                    state.temperature, state.humidity
                );
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to send telemetry");
                false
            }
        };

        let signal = decide(state.temperature);
        info!(signal = %signal, "refrigerator {}", signal);
        let humidity_alert = humidity_alert(state.humidity);
        if humidity_alert {
            warn!(
                humidity = state.humidity,
                limit = HUMIDITY_LIMIT_PCT,
                "humidity above limit"
            );
        }

        TickReport {
            tick,
            state: *state,
            signal,
            humidity_alert,
            published,
        }
    }
}

/// Start a delivery, let the worker tick for `duration`, then stop it and
/// wait for the worker to exit.
pub async fn run_delivery<S>(
    controller: &DeliveryController,
    scheduler: TickScheduler<S>,
    duration: Duration,
) -> Result<RunSummary>
where
    S: SensorSource + 'static,
{
    run_delivery_until(controller, scheduler, duration, std::future::pending()).await
}

/// Like [`run_delivery`], but `interrupt` can end the delivery early
/// (the binary wires Ctrl+C here).
pub async fn run_delivery_until<S, F>(
    controller: &DeliveryController,
    scheduler: TickScheduler<S>,
    duration: Duration,
    interrupt: F,
) -> Result<RunSummary>
where
    S: SensorSource + 'static,
    F: Future<Output = ()>,
{
    controller.start()?;
    let worker = tokio::spawn(scheduler.run(controller.subscribe()));

    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = interrupt => {
            warn!("delivery interrupted before planned duration");
        }
    }

    controller.stop()?;
    let summary = worker.await.map_err(SimulationError::from)?;
    info!(
        ticks = summary.ticks,
        publish_failures = summary.publish_failures,
        "simulation complete"
    );
    Ok(summary)
}
